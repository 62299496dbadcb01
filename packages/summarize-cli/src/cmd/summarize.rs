use anyhow::{Context, Result};
use clap::Args;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use summarization::{
    BuiltinTemplates, CategoryCode, DirectoryTemplates, HttpGenerator, SerializedGenerator,
    Summarizer, SummarizerConfig, TemplateSource,
};

use super::{document_name, read_document};
use crate::context::AppContext;

#[derive(Args)]
pub struct SummarizeArgs {
    /// Plain-text document
    pub file: PathBuf,

    /// Category code; detected from the document when omitted
    #[arg(short, long)]
    pub category: Option<String>,

    /// Filename to classify by, when it differs from FILE
    #[arg(long)]
    pub name: Option<String>,

    /// Directory with `<code>.txt` templates (or FS_PROMPTS_DIR)
    #[arg(long)]
    pub prompts: Option<PathBuf>,

    /// Completion server base URL (or FS_LLM_URL)
    #[arg(long)]
    pub llm_url: Option<String>,

    /// Model name sent to the completion server (or FS_LLM_MODEL)
    #[arg(long)]
    pub model: Option<String>,

    /// Only summarize the first chunk(s)
    #[arg(long)]
    pub fast: bool,

    /// Skip the corrective repair pass
    #[arg(long)]
    pub no_repair: bool,

    /// Write the summary here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(ctx: &AppContext, args: SummarizeArgs) -> Result<()> {
    let text = read_document(&args.file)?;

    let category = match &args.category {
        Some(code) => CategoryCode::new(code),
        None => {
            let name = document_name(&args.file, args.name.clone());
            let category = ctx.classifier().classify(&name, &text);
            ctx.print_info(&format!("Detected category: {}", category));
            category
        }
    };

    let mut config = SummarizerConfig::from_env().context("Invalid FS_* configuration")?;
    if args.fast {
        let chunks = config.fast_max_chunks;
        config = config.with_fast_mode(chunks);
    }
    if args.no_repair {
        config = config.with_repair(false);
    }

    let generator = match &args.llm_url {
        Some(url) => HttpGenerator::new(url.clone()),
        None => HttpGenerator::from_env().context("Pass --llm-url or set FS_LLM_URL")?,
    };
    let generator = match args.model.clone() {
        Some(model) => generator.with_model(model),
        None => generator,
    };
    let generator = Arc::new(SerializedGenerator::new(generator));

    let prompts = args
        .prompts
        .clone()
        .or_else(|| env::var_os("FS_PROMPTS_DIR").map(PathBuf::from));

    ctx.print_header(&format!("Summarizing {} as {}", args.file.display(), category));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let summary = match prompts {
        Some(dir) => runtime.block_on(summarize_with(
            ctx,
            generator,
            DirectoryTemplates::new(dir),
            config,
            &category,
            &text,
        ))?,
        None => runtime.block_on(summarize_with(
            ctx,
            generator,
            BuiltinTemplates,
            config,
            &category,
            &text,
        ))?,
    };

    match &args.output {
        Some(path) => {
            fs::write(path, &summary)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            ctx.print_success(&format!("Summary written to {}", path.display()));
        }
        None => println!("{}", summary),
    }
    Ok(())
}

async fn summarize_with<T: TemplateSource>(
    ctx: &AppContext,
    generator: Arc<SerializedGenerator<HttpGenerator>>,
    templates: T,
    config: SummarizerConfig,
    category: &CategoryCode,
    text: &str,
) -> Result<String> {
    let summarizer = Summarizer::new(generator, templates).with_config(config);
    let progress = |event: &summarization::ProgressEvent| ctx.print_progress(event);

    let summary = summarizer
        .summarize_document(category, text, &progress)
        .await
        .context("Summarization failed")?;
    tracing::info!(output_chars = summary.len(), "summary ready");
    Ok(summary)
}
