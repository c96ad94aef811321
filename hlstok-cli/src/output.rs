use crate::{cli::OutputFormat, error::Result, source::Source};
#[cfg(feature = "colored-output")]
use colored::*;
use hls::{Analysis, Diagnostic, Severity, Token, TokenStats};
use serde::Serialize;

#[derive(Serialize)]
struct Report<'a> {
    source: String,
    tokens: &'a [(usize, Token)],
    #[serde(skip_serializing_if = "Option::is_none")]
    diagnostics: Option<&'a [Diagnostic]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<&'a TokenStats>,
}

pub struct OutputManager {
    format: OutputFormat,
    colored: bool,
}

impl OutputManager {
    pub fn new(format: OutputFormat, colored: bool) -> Self {
        Self { format, colored }
    }

    pub fn format_analysis(
        &self,
        source: &Source,
        analysis: &Analysis,
        tokens_only: bool,
    ) -> Result<String> {
        match self.format {
            OutputFormat::Pretty => Ok(self.format_pretty(source, analysis, tokens_only)),
            OutputFormat::Json => self.format_json(source, analysis, tokens_only, true),
            OutputFormat::JsonCompact => self.format_json(source, analysis, tokens_only, false),
        }
    }

    fn format_pretty(&self, source: &Source, analysis: &Analysis, tokens_only: bool) -> String {
        let mut output = String::new();

        output.push_str(&self.colorize(&format!("{source}:"), &Color::Green, true));
        output.push('\n');
        for (index, token) in &analysis.tokens {
            let line = format!("{:>5}  {token}", index + 1);
            let color = match token {
                Token::Error(_) => Color::Red,
                Token::Tag(_) => Color::Cyan,
                _ => Color::Plain,
            };
            output.push_str(&self.colorize(&line, &color, false));
            output.push('\n');
        }

        if tokens_only {
            return output;
        }

        if !analysis.diagnostics.is_empty() {
            output.push('\n');
            output.push_str(&self.colorize("Diagnostics:", &Color::Green, true));
            output.push('\n');
            for diagnostic in &analysis.diagnostics {
                let color = match diagnostic.severity {
                    Severity::Error => Color::Red,
                    Severity::Warning => Color::Yellow,
                };
                output.push_str("  ");
                output.push_str(&self.colorize(&diagnostic.to_string(), &color, false));
                output.push('\n');
            }
        }

        output.push('\n');
        output.push_str(&analysis.stats.to_string());
        output.push('\n');
        output
    }

    fn format_json(
        &self,
        source: &Source,
        analysis: &Analysis,
        tokens_only: bool,
        pretty: bool,
    ) -> Result<String> {
        let report = Report {
            source: source.to_string(),
            tokens: &analysis.tokens,
            diagnostics: (!tokens_only).then_some(analysis.diagnostics.as_slice()),
            stats: (!tokens_only).then_some(&analysis.stats),
        };

        let mut output = if pretty {
            serde_json::to_string_pretty(&report)?
        } else {
            serde_json::to_string(&report)?
        };
        output.push('\n');
        Ok(output)
    }

    fn colorize(&self, text: &str, color: &Color, bold: bool) -> String {
        #[cfg(feature = "colored-output")]
        {
            if self.colored {
                let colored_text = match color {
                    Color::Green => text.green(),
                    Color::Yellow => text.yellow(),
                    Color::Red => text.red(),
                    Color::Cyan => text.cyan(),
                    Color::Plain => text.normal(),
                };
                if bold {
                    colored_text.bold().to_string()
                } else {
                    colored_text.to_string()
                }
            } else {
                text.to_string()
            }
        }

        #[cfg(not(feature = "colored-output"))]
        {
            let _ = (color, bold, self.colored);
            text.to_string()
        }
    }
}

enum Color {
    Green,
    Yellow,
    Red,
    Cyan,
    Plain,
}

#[cfg(test)]
mod tests {
    use super::*;
    use hls::PlaylistAnalyzer;

    const PLAYLIST: &[u8] = b"#EXTM3U\n#EXT-X-VERSION:2\n#EXTINF:9.5,\nsegment.ts\n";

    fn analysis() -> Analysis {
        PlaylistAnalyzer::default().analyze(PLAYLIST)
    }

    #[test]
    fn test_pretty_output() {
        let output = OutputManager::new(OutputFormat::Pretty, false);
        let source = Source::parse("index.m3u8");
        let text = output.format_analysis(&source, &analysis(), false).unwrap();

        assert!(text.starts_with("index.m3u8:\n"));
        assert!(text.contains("    1  TAG - EXTM3U\n"));
        assert!(text.contains("    4  URI - segment.ts\n"));
        assert!(text.contains("Diagnostics:\n  line 3: error [version]"));
        assert!(text.contains("Playlist Statistics:"));
    }

    #[test]
    fn test_pretty_tokens_only() {
        let output = OutputManager::new(OutputFormat::Pretty, false);
        let source = Source::parse("index.m3u8");
        let text = output.format_analysis(&source, &analysis(), true).unwrap();
        assert!(!text.contains("Diagnostics:"));
        assert!(!text.contains("Playlist Statistics:"));
    }

    #[test]
    fn test_json_output() {
        let output = OutputManager::new(OutputFormat::JsonCompact, false);
        let source = Source::parse("index.m3u8");
        let text = output.format_analysis(&source, &analysis(), false).unwrap();
        assert_eq!(text.lines().count(), 1);

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["source"], "index.m3u8");
        assert_eq!(value["tokens"].as_array().unwrap().len(), 4);
        assert_eq!(value["diagnostics"][0]["rule"], "version");
        assert_eq!(value["diagnostics"][0]["severity"], "error");
        assert_eq!(value["stats"]["rule_errors"], 1);

        let text = output.format_analysis(&source, &analysis(), true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(value.get("diagnostics").is_none());
        assert!(value.get("stats").is_none());
    }
}
