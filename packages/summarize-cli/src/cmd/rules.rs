use anyhow::Result;

use crate::context::AppContext;

pub fn run(ctx: &AppContext) -> Result<()> {
    let classifier = ctx.classifier();
    println!("{}", serde_json::to_string_pretty(classifier.rules())?);
    Ok(())
}
