//! Result sinks: CSV, JSON and the plain text summary.

use rebar_core::{ExtractionMode, ExtractionResult};

/// Output format for extraction results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// CSV with Circle Code, Material Code and Page columns
    Csv,
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Text => "txt",
        }
    }
}

pub fn format_result(
    result: &ExtractionResult,
    format: OutputFormat,
    mode: &ExtractionMode,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Text => Ok(format_text(result, mode)),
    }
}

fn format_csv(result: &ExtractionResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["Circle Code", "Material Code", "Page"])?;

    for record in result.records() {
        wtr.write_record([
            record.circle_code.as_ref().map_or("", |c| c.as_str()),
            record.material_code.as_str(),
            &record.page.to_string(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ExtractionResult, mode: &ExtractionMode) -> String {
    let rule = "-".repeat(50);
    let mut output = String::new();

    match mode {
        ExtractionMode::AllMaterials => {
            if result.is_empty() {
                return "No materials found\n".to_string();
            }

            output.push_str("ALL MATERIALS (WITH OR WITHOUT CIRCLE CODES):\n");
            output.push_str(&format!("{}\n", rule));
            for record in result.records() {
                if let Some(code) = &record.circle_code {
                    output.push_str(&format!("{}: ", code));
                }
                output.push_str(&format!("{} (Page {})\n", record.material_code, record.page));
            }
            output.push_str(&format!("\n{}\n", "=".repeat(50)));
            output.push_str(&format!("TOTAL MATERIALS FOUND: {}\n", result.len()));
        }
        ExtractionMode::AllWithCircleCode | ExtractionMode::FilteredByCodes(_) => {
            if let ExtractionMode::FilteredByCodes(codes) = mode {
                if result.is_empty() && !codes.is_empty() {
                    let codes: Vec<&str> = codes.iter().collect();
                    return format!(
                        "No materials found for the specified circle codes: {}\n",
                        codes.join(", ")
                    );
                }
            }
            if result.is_empty() {
                return "No materials found\n".to_string();
            }

            output.push_str(&format!(
                "ALL MATERIALS WITH CIRCLE CODE COUNT: {}\n",
                result.len()
            ));
            output.push_str(&format!("{}\n", rule));
            for record in result.records() {
                let code = record.circle_code.as_ref().map_or("", |c| c.as_str());
                output.push_str(&format!(
                    "{}: {} (Page {})\n",
                    code, record.material_code, record.page
                ));
            }

            output.push_str("\nMATERIALS WITH CIRCLE CODES:\n");
            output.push_str(&format!("{}\n", rule));
            match mode {
                ExtractionMode::FilteredByCodes(codes) if !codes.is_empty() => {
                    for code in codes.iter() {
                        output.push_str(&format!(
                            "{}: {} materials found\n",
                            code,
                            result.count_for(code)
                        ));
                    }
                }
                _ => {
                    for (code, count) in result.counts().iter() {
                        output.push_str(&format!("{}: {} materials found\n", code, count));
                    }
                }
            }
            output.push_str(&format!("\n{}\n", "=".repeat(50)));
            output.push_str(&format!(
                "TOTAL MATERIALS WITH CIRCLE CODES: {}\n",
                result.with_code_count()
            ));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use rebar_core::models::{PageId, TextSource};
    use rebar_core::{parse_code_list, PageExtractor, ResultFilter};

    fn sample() -> ExtractionResult {
        let page = PageExtractor::new().extract_page(
            "5Rfi12/8cm,L=3.5m' T1\n2Rfi10/20cm\n\nnotes here\n4Rfi8/15cm,L=2m T2",
            None,
            PageId::new(2),
        );
        ExtractionResult::from_records(page.records, TextSource::Native)
    }

    #[test]
    fn test_csv_columns_and_order() {
        let csv = format_result(&sample(), OutputFormat::Csv, &ExtractionMode::AllMaterials).unwrap();
        assert_eq!(
            csv,
            "Circle Code,Material Code,Page\n\
             T1,\"5Rfi12/8cm,L=3.5m\",2\n\
             ,2Rfi10/20cm,2\n\
             T2,\"4Rfi8/15cm,L=2m\",2\n"
        );
    }

    #[test]
    fn test_text_all_materials() {
        let text = format_result(&sample(), OutputFormat::Text, &ExtractionMode::AllMaterials).unwrap();
        assert!(text.starts_with("ALL MATERIALS (WITH OR WITHOUT CIRCLE CODES):\n"));
        assert!(text.contains("T1: 5Rfi12/8cm,L=3.5m (Page 2)\n"));
        assert!(text.contains("\n2Rfi10/20cm (Page 2)\n"));
        assert!(text.ends_with("TOTAL MATERIALS FOUND: 3\n"));
    }

    #[test]
    fn test_text_filtered_lists_requested_codes() {
        let result = sample();
        let mode = ExtractionMode::FilteredByCodes(parse_code_list("t1,B2"));
        let view = ResultFilter::new(&result).apply(&mode);

        let text = format_result(&view, OutputFormat::Text, &mode).unwrap();
        assert!(text.starts_with("ALL MATERIALS WITH CIRCLE CODE COUNT: 1\n"));
        assert!(text.contains("t1: 1 materials found\n"));
        assert!(text.contains("B2: 0 materials found\n"));
        assert!(text.ends_with("TOTAL MATERIALS WITH CIRCLE CODES: 1\n"));
    }

    #[test]
    fn test_text_filtered_nothing_found() {
        let mode = ExtractionMode::FilteredByCodes(parse_code_list("X9"));
        let empty = ExtractionResult::empty(TextSource::Ocr);
        let text = format_result(&empty, OutputFormat::Text, &mode).unwrap();
        assert_eq!(text, "No materials found for the specified circle codes: X9\n");
    }

    #[test]
    fn test_json_round_trips() {
        let result = sample();
        let json = format_result(&result, OutputFormat::Json, &ExtractionMode::AllMaterials).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["source"], "native");
        assert_eq!(value["records"][0]["circle_code"], "T1");
        assert_eq!(value["counts"]["T1"], 1);
    }
}
