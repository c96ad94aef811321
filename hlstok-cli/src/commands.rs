use crate::{
    cli::OutputFormat,
    config::AppConfig,
    error::{AppError, Result},
    output::OutputManager,
    source::{Loader, Source},
};
use hls::{Analysis, Details, PlaylistAnalyzer, TokenStats, Tokenizer};
use std::io::Write;
use tracing::{error, info, warn};

/// Effective options of a `lint` run, after merging flags over the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LintOptions {
    pub details: Details,
    pub format: OutputFormat,
    pub rules: bool,
    pub tokens_only: bool,
    pub strict: bool,
}

pub struct CommandExecutor {
    config: AppConfig,
    loader: Loader,
}

impl CommandExecutor {
    pub fn new(config: AppConfig) -> Result<Self> {
        let loader = Loader::new(&config)?;
        Ok(Self { config, loader })
    }

    /// Lints every input in order. Fails when at least one input could not be
    /// loaded or did not pass.
    pub async fn lint(&self, inputs: &[String], options: LintOptions) -> Result<()> {
        let output = OutputManager::new(options.format, self.config.colored_output);
        let mut failed = 0;

        for input in inputs {
            let source = Source::parse(input);
            let data = match self.loader.load(&source).await {
                Ok(data) => data,
                Err(e) => {
                    error!(%source, error = %e, "failed to load playlist");
                    eprintln!("{e}");
                    failed += 1;
                    continue;
                }
            };

            let analysis = analyze(&source, &data, &options);
            let rendered = output.format_analysis(&source, &analysis, options.tokens_only)?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;

            if passes(&analysis.stats, options.strict) {
                info!(%source, "playlist passed");
            } else {
                warn!(
                    %source,
                    parse_errors = analysis.stats.parse_errors,
                    rule_errors = analysis.stats.rule_errors,
                    rule_warnings = analysis.stats.rule_warnings,
                    "playlist failed"
                );
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(AppError::LintFailed {
                failed,
                total: inputs.len(),
            });
        }
        Ok(())
    }
}

/// Runs one playlist through a fresh tokenizer and rule engine.
pub fn analyze(source: &Source, data: &[u8], options: &LintOptions) -> Analysis {
    let mut tokenizer = Tokenizer::builder();
    if let Some(base_url) = source.base_url() {
        tokenizer = tokenizer.base_url(base_url.clone());
    }
    PlaylistAnalyzer::new(tokenizer.build())
        .with_details(options.details)
        .with_rules(options.rules)
        .analyze(data)
}

/// Parse errors and error diagnostics always fail; warnings fail in strict mode.
pub fn passes(stats: &TokenStats, strict: bool) -> bool {
    !stats.has_errors() && !(strict && stats.has_warnings())
}
