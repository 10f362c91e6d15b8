use super::types::RecognizedToken;

/// TSV row level for individual words.
pub const TSV_WORD_LEVEL: u32 = 5;
/// Columns in a complete Tesseract TSV row.
pub const TSV_MIN_FIELDS: usize = 11;

/// Parse word rows out of Tesseract TSV output.
///
/// Tesseract TSV columns are `level page_num block_num par_num line_num word_num
/// left top width height conf text`. Only word-level rows are kept, in the order
/// the engine emitted them. Confidences are truncated to whole numbers, as the
/// classic Tesseract output reports them. No confidence filtering happens
/// here; an empty trailing `text` column yields a token with empty text.
pub fn parse_tsv_tokens(tsv_data: &str) -> Vec<RecognizedToken> {
    let mut tokens = Vec::new();

    for (line_num, line) in tsv_data.lines().enumerate() {
        if line_num == 0 && line.starts_with("level") {
            continue;
        }

        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < TSV_MIN_FIELDS {
            continue;
        }

        let level = fields[0].trim().parse::<u32>().unwrap_or(0);
        if level != TSV_WORD_LEVEL {
            continue;
        }

        let confidence = fields[10].trim().parse::<f64>().map(f64::trunc).unwrap_or(-1.0);
        let text = fields.get(11).map(|t| t.trim()).unwrap_or_default();

        tokens.push(RecognizedToken {
            text: text.to_string(),
            confidence,
            left: fields[6].trim().parse().unwrap_or(0),
            top: fields[7].trim().parse().unwrap_or(0),
            width: fields[8].trim().parse().unwrap_or(0),
            height: fields[9].trim().parse().unwrap_or(0),
        });
    }

    tokens
}
