//! Templates compiled into the library.

use crate::error::Result;
use crate::traits::template::{TemplatePair, TemplateSource};
use crate::types::category::CategoryCode;

const PJ: &str = include_str!("../../prompts/pj.txt");
const PV: &str = include_str!("../../prompts/pv.txt");
const RECLASS: &str = include_str!("../../prompts/reclass.txt");
const TLL: &str = include_str!("../../prompts/tll.txt");
const UJD: &str = include_str!("../../prompts/ujd.txt");
const VC: &str = include_str!("../../prompts/vc.txt");
const UNKNOWN: &str = include_str!("../../prompts/unknown.txt");

/// Default Dutch templates for the default category set.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTemplates;

impl BuiltinTemplates {
    fn text_for(code: &str) -> &'static str {
        match code {
            "PJ" => PJ,
            "PV" => PV,
            "RECLASS" => RECLASS,
            "TLL" => TLL,
            "UJD" => UJD,
            "VC" => VC,
            _ => UNKNOWN,
        }
    }
}

impl TemplateSource for BuiltinTemplates {
    fn load(&self, category: &CategoryCode) -> Result<TemplatePair> {
        Ok(TemplatePair::parse(Self::text_for(category.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::category::DEFAULT_CATEGORIES;

    #[test]
    fn test_every_default_category_has_map_and_reduce() {
        for code in DEFAULT_CATEGORIES.iter().copied().chain(["UNKNOWN"]) {
            let pair = BuiltinTemplates.load(&CategoryCode::new(code)).unwrap();
            assert!(!pair.map.is_empty(), "{code} has no map template");
            assert!(pair.has_reduce(), "{code} has no reduce template");
        }
    }

    #[test]
    fn test_unlisted_category_gets_generic_templates() {
        let pair = BuiltinTemplates.load(&CategoryCode::new("OUD_PJ")).unwrap();
        assert_eq!(pair, TemplatePair::parse(UNKNOWN));
    }
}
