use anyhow::Result;
use std::path::Path;

use super::{document_name, read_document};
use crate::context::AppContext;

pub fn run(ctx: &AppContext, file: &Path, name: Option<String>, json: bool) -> Result<()> {
    let content = read_document(file)?;
    let name = document_name(file, name);
    let result = ctx.classifier().classify_detailed(&name, &content);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.category);
    }
    Ok(())
}
