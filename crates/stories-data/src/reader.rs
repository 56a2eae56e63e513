//! CSV loading for Instagram Stories exports.
//!
//! Reads the current-year and prior-year uploads, resolves their header rows
//! against the accepted column aliases and converts every record into a
//! [`MetricRow`]. Validation is all-or-nothing: any bad cell rejects the whole
//! file so that no partial dataset ever reaches aggregation.

use std::io::Read;
use std::path::Path;

use stories_core::brands::{BrandResolver, UNKNOWN_BRAND};
use stories_core::models::{Dataset, MetricRow, Period};
use stories_core::time_utils::parse_timestamp;
use stories_core::{DashboardError, Result};
use tracing::{debug, info};

/// Content type assigned to rows with a blank type cell.
pub const UNKNOWN_CONTENT_TYPE: &str = "Unknown";

// ── Column aliases ────────────────────────────────────────────────────────────

// Aliases are compared after `normalize_header`, so they are written in
// lowercase, without accents and with single spaces.
const BRAND_ALIASES: &[&str] = &["brand", "marca"];
const ACCOUNT_ALIASES: &[&str] = &["account", "account name", "nome da conta", "conta"];
const CONTENT_TYPE_ALIASES: &[&str] = &[
    "content type",
    "type",
    "post type",
    "tipo",
    "tipo de publicacao",
];
const DATE_ALIASES: &[&str] = &[
    "date",
    "published at",
    "publish time",
    "data",
    "horario de publicacao",
];
const IMPRESSIONS_ALIASES: &[&str] = &["impressions", "impressoes", "visualizacoes", "views"];
const REACH_ALIASES: &[&str] = &["reach", "alcance"];
const INTERACTIONS_ALIASES: &[&str] = &["interactions", "engagement", "interacoes"];
const REPLIES_ALIASES: &[&str] = &["replies", "respostas"];
const SHARES_ALIASES: &[&str] = &["shares", "compartilhamentos"];

/// Where the interaction count of a row comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InteractionsSource {
    Column(usize),
    /// The export has no interactions column: replies + shares. Holds the
    /// shares column, which is blamed when the sum overflows.
    RepliesPlusShares(usize),
}

/// Header positions of every field the reader needs.
#[derive(Debug, Clone)]
struct ColumnMap {
    brand: Option<usize>,
    account: Option<usize>,
    content_type: usize,
    date: usize,
    impressions: usize,
    reach: usize,
    interactions: InteractionsSource,
    replies: Option<usize>,
    shares: Option<usize>,
}

impl ColumnMap {
    /// Resolve the header row, reporting every missing required column at once.
    fn resolve(headers: &[String], file: &str) -> Result<Self> {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
        let find = |aliases: &[&str]| {
            aliases
                .iter()
                .find_map(|alias| normalized.iter().position(|h| h == alias))
        };

        let brand = find(BRAND_ALIASES);
        let account = find(ACCOUNT_ALIASES);
        let content_type = find(CONTENT_TYPE_ALIASES);
        let date = find(DATE_ALIASES);
        let impressions = find(IMPRESSIONS_ALIASES);
        let reach = find(REACH_ALIASES);
        let replies = find(REPLIES_ALIASES);
        let shares = find(SHARES_ALIASES);
        let interactions = match (find(INTERACTIONS_ALIASES), replies, shares) {
            (Some(idx), _, _) => Some(InteractionsSource::Column(idx)),
            (None, Some(_), Some(shares)) => Some(InteractionsSource::RepliesPlusShares(shares)),
            _ => None,
        };

        let mut missing = Vec::new();
        if brand.is_none() && account.is_none() {
            missing.push("brand");
        }
        if content_type.is_none() {
            missing.push("content_type");
        }
        if date.is_none() {
            missing.push("date");
        }
        if impressions.is_none() {
            missing.push("impressions");
        }
        if reach.is_none() {
            missing.push("reach");
        }
        if interactions.is_none() {
            missing.push("interactions");
        }

        match (content_type, date, impressions, reach, interactions) {
            (Some(content_type), Some(date), Some(impressions), Some(reach), Some(interactions))
                if missing.is_empty() =>
            {
                Ok(Self {
                    brand,
                    account,
                    content_type,
                    date,
                    impressions,
                    reach,
                    interactions,
                    replies,
                    shares,
                })
            }
            _ => Err(DashboardError::MissingColumns {
                file: file.to_string(),
                columns: missing.into_iter().map(String::from).collect(),
            }),
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Parse one uploaded export held in memory.
///
/// `source_name` is the client-side file name and is only kept for display.
pub fn read_dataset(
    period: Period,
    source_name: &str,
    bytes: &[u8],
    brands: &BrandResolver,
) -> Result<Dataset> {
    let file = period.to_string();
    let text = decode_text(bytes, &file)?;
    if text.trim().is_empty() {
        return Err(DashboardError::FileFormat {
            file,
            message: "the file is empty".to_string(),
        });
    }

    let delimiter = sniff_delimiter(text);
    debug!(file = %file, delimiter = %char::from(delimiter), "reading export");

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| csv_error(&file, &e))?
        .iter()
        .map(String::from)
        .collect();
    let columns = ColumnMap::resolve(&headers, &file)?;
    debug!(file = %file, ?columns, "resolved columns");

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| csv_error(&file, &e))?;
        rows.push(parse_record(&record, idx + 1, &columns, &headers, &file, brands)?);
    }

    if rows.is_empty() {
        return Err(DashboardError::NoData(format!(
            "the {file} file has a header but no data rows"
        )));
    }

    info!(file = %file, source = source_name, rows = rows.len(), "export loaded");
    Ok(Dataset::new(period, source_name, rows))
}

/// Read and parse an export from disk.
///
/// The file handle is scoped to this call and closed on every path.
pub fn read_dataset_from_path(
    period: Period,
    path: &Path,
    brands: &BrandResolver,
) -> Result<Dataset> {
    let mut bytes = Vec::new();
    std::fs::File::open(path)
        .and_then(|mut f| f.read_to_end(&mut bytes))
        .map_err(|source| DashboardError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    read_dataset(period, &name, &bytes, brands)
}

/// Parse both exports; either failure rejects the pair.
pub fn read_pair(
    current: (&str, &[u8]),
    prior: (&str, &[u8]),
    brands: &BrandResolver,
) -> Result<(Dataset, Dataset)> {
    let current = read_dataset(Period::Current, current.0, current.1, brands)?;
    let prior = read_dataset(Period::Prior, prior.0, prior.1, brands)?;
    Ok((current, prior))
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Decode UTF-8 input, dropping a byte-order mark.
fn decode_text<'a>(bytes: &'a [u8], file: &str) -> Result<&'a str> {
    if bytes.starts_with(&[0xFF, 0xFE]) || bytes.starts_with(&[0xFE, 0xFF]) {
        return Err(DashboardError::FileFormat {
            file: file.to_string(),
            message: "UTF-16 files are not supported; save the export as UTF-8 CSV".to_string(),
        });
    }
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
    std::str::from_utf8(bytes).map_err(|e| DashboardError::FileFormat {
        file: file.to_string(),
        message: format!("the file is not valid UTF-8 text ({e})"),
    })
}

/// Choose `;`, tab or `,` by counting candidates on the header line.
fn sniff_delimiter(text: &str) -> u8 {
    let header = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    let count = |c: char| header.matches(c).count();
    let (semicolons, tabs, commas) = (count(';'), count('\t'), count(','));
    if semicolons > commas && semicolons >= tabs {
        b';'
    } else if tabs > commas {
        b'\t'
    } else {
        b','
    }
}

fn csv_error(file: &str, err: &csv::Error) -> DashboardError {
    DashboardError::FileFormat {
        file: file.to_string(),
        message: err.to_string(),
    }
}

/// Lowercase, strip Portuguese accents and collapse `_`, `-` and whitespace.
fn normalize_header(raw: &str) -> String {
    let folded: String = raw
        .trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'ê' | 'è' | 'ë' => 'e',
            'í' | 'î' | 'ì' | 'ï' => 'i',
            'ó' | 'ô' | 'õ' | 'ò' | 'ö' => 'o',
            'ú' | 'û' | 'ù' | 'ü' => 'u',
            'ç' => 'c',
            '_' | '-' => ' ',
            other => other,
        })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse a non-negative whole count. Blank cells count as zero.
///
/// Plain integers are parsed exactly; decimal forms such as `"12.0"` are
/// accepted only when they are whole and fit in `u64`.
fn parse_count(raw: &str) -> std::result::Result<u64, &'static str> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(0);
    }
    let digits = s.strip_prefix('+').unwrap_or(s);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        return digits.parse::<u64>().map_err(|_| "number is too large");
    }
    let value: f64 = s.parse().map_err(|_| "expected a number")?;
    if !value.is_finite() {
        return Err("expected a finite number");
    }
    if value < 0.0 {
        return Err("must not be negative");
    }
    if value.fract() != 0.0 {
        return Err("expected a whole number");
    }
    if value >= MAX_EXACT_DECIMAL {
        return Err("number is too large");
    }
    Ok(value as u64)
}

/// Whole values written in decimal form must stay below 2^53 to be exact.
const MAX_EXACT_DECIMAL: f64 = 9_007_199_254_740_992.0;

fn parse_record(
    record: &csv::StringRecord,
    row: usize,
    columns: &ColumnMap,
    headers: &[String],
    file: &str,
    brands: &BrandResolver,
) -> Result<MetricRow> {
    let cell = |idx: usize| record.get(idx).unwrap_or("").trim();
    let invalid = |idx: usize, reason: &str| DashboardError::InvalidValue {
        file: file.to_string(),
        row,
        column: headers.get(idx).cloned().unwrap_or_default(),
        value: cell(idx).to_string(),
        reason: reason.to_string(),
    };
    let count = |idx: usize| parse_count(cell(idx)).map_err(|reason| invalid(idx, reason));

    let account = columns.account.map(cell).unwrap_or("");
    let brand = match columns.brand.map(cell) {
        Some(brand) if !brand.is_empty() => brand.to_string(),
        _ if columns.account.is_some() => brands.resolve(account),
        _ => UNKNOWN_BRAND.to_string(),
    };
    let account = if account.is_empty() {
        brand.clone()
    } else {
        account.to_string()
    };

    let content_type = match cell(columns.content_type) {
        "" => UNKNOWN_CONTENT_TYPE.to_string(),
        value => value.to_string(),
    };

    let published_at = parse_timestamp(cell(columns.date))
        .ok_or_else(|| invalid(columns.date, "unrecognised date"))?;

    let impressions = count(columns.impressions)?;
    let reach = count(columns.reach)?;
    let replies = columns.replies.map(count).transpose()?;
    let shares = columns.shares.map(count).transpose()?;
    let interactions = match columns.interactions {
        InteractionsSource::Column(idx) => count(idx)?,
        InteractionsSource::RepliesPlusShares(shares_idx) => replies
            .unwrap_or(0)
            .checked_add(shares.unwrap_or(0))
            .ok_or_else(|| invalid(shares_idx, "number is too large"))?,
    };

    Ok(MetricRow {
        brand,
        account,
        content_type,
        published_at,
        impressions,
        reach,
        interactions,
        replies,
        shares,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use stories_core::brands::BrandRule;
    use stories_core::ErrorKind;
    use tempfile::TempDir;

    const CANONICAL: &str = "\
brand,content_type,date,impressions,reach,interactions
A,Photo,2024-01-15,1000,800,80
A,Photo,2024-01-20,500,200,20
B,Video,2024-02-03,300,0,0
";

    fn read(csv: &str) -> Result<Dataset> {
        read_dataset(
            Period::Current,
            "stories.csv",
            csv.as_bytes(),
            &BrandResolver::default(),
        )
    }

    // ── read_dataset ──────────────────────────────────────────────────────────

    #[test]
    fn test_read_canonical_columns() {
        let ds = read(CANONICAL).unwrap();
        assert_eq!(ds.period, Period::Current);
        assert_eq!(ds.source_name, "stories.csv");
        assert_eq!(ds.rows.len(), 3);

        let first = &ds.rows[0];
        assert_eq!(first.brand, "A");
        assert_eq!(first.account, "A");
        assert_eq!(first.content_type, "Photo");
        assert_eq!(first.published_at.to_string(), "2024-01-15 00:00:00");
        assert_eq!(first.impressions, 1000);
        assert_eq!(first.reach, 800);
        assert_eq!(first.interactions, 80);
        assert_eq!(first.replies, None);
    }

    #[test]
    fn test_read_instagram_export_with_brand_rules() {
        let csv = "\
\u{feff}Nome da conta;Tipo de publicação;Horário de publicação;Impressões;Alcance;Respostas;Compartilhamentos
acme.oficial;Story;01/15/2024 10:30;1200;800;50;30
Globex Brasil;Story;01/16/2024 09:00;700;400;10;2
outra conta;Story;01/17/2024 09:00;10;10;0;0
";
        let resolver = BrandResolver::new(vec![
            "acme=Acme".parse::<BrandRule>().unwrap(),
            BrandRule::new("globex", "Globex").unwrap(),
        ]);
        let ds = read_dataset(Period::Prior, "export.csv", csv.as_bytes(), &resolver).unwrap();
        assert_eq!(ds.rows.len(), 3);
        assert_eq!(ds.rows[0].brand, "Acme");
        assert_eq!(ds.rows[0].account, "acme.oficial");
        assert_eq!(ds.rows[0].interactions, 80);
        assert_eq!(ds.rows[0].replies, Some(50));
        assert_eq!(ds.rows[0].shares, Some(30));
        assert_eq!(ds.rows[1].brand, "Globex");
        assert_eq!(ds.rows[2].brand, UNKNOWN_BRAND);
    }

    #[test]
    fn test_missing_reach_is_schema_error() {
        let csv = "brand,content_type,date,impressions,interactions\nA,Photo,2024-01-15,10,1\n";
        let err = read(csv).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
        match err {
            DashboardError::MissingColumns { file, columns } => {
                assert_eq!(file, "current");
                assert_eq!(columns, vec!["reach".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_columns_reported_together() {
        let csv = "foo,bar\n1,2\n";
        match read(csv).unwrap_err() {
            DashboardError::MissingColumns { columns, .. } => {
                assert_eq!(
                    columns,
                    vec![
                        "brand",
                        "content_type",
                        "date",
                        "impressions",
                        "reach",
                        "interactions"
                    ]
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_replies_without_shares_does_not_satisfy_interactions() {
        let csv = "brand,type,date,impressions,reach,replies\nA,Story,2024-01-01,1,1,1\n";
        match read(csv).unwrap_err() {
            DashboardError::MissingColumns { columns, .. } => {
                assert_eq!(columns, vec!["interactions".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_numeric_value_rejected() {
        let csv = "brand,content_type,date,impressions,reach,interactions\nA,Photo,2024-01-15,1000,lots,80\n";
        match read(csv).unwrap_err() {
            DashboardError::InvalidValue {
                row, column, value, ..
            } => {
                assert_eq!(row, 1);
                assert_eq!(column, "reach");
                assert_eq!(value, "lots");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_negative_and_fractional_values_rejected() {
        let negative = "brand,content_type,date,impressions,reach,interactions\nA,Photo,2024-01-15,10,10,-1\n";
        let err = read(negative).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
        assert!(err.to_string().contains("must not be negative"));

        let fractional = "brand,content_type,date,impressions,reach,interactions\nA,Photo,2024-01-15,10,10.5,1\n";
        assert!(read(fractional)
            .unwrap_err()
            .to_string()
            .contains("whole number"));

        let nan = "brand,content_type,date,impressions,reach,interactions\nA,Photo,2024-01-15,NaN,10,1\n";
        assert_eq!(read(nan).unwrap_err().kind(), ErrorKind::Schema);
    }

    #[test]
    fn test_float_formatted_counts_and_blanks_accepted() {
        let csv = "brand,content_type,date,impressions,reach,interactions\nA,Photo,2024-01-15,1000.0,,80\n";
        let ds = read(csv).unwrap();
        assert_eq!(ds.rows[0].impressions, 1000);
        assert_eq!(ds.rows[0].reach, 0);
    }

    #[test]
    fn test_bad_date_rejected() {
        let csv = "brand,content_type,date,impressions,reach,interactions\nA,Photo,someday,1,1,1\n";
        match read(csv).unwrap_err() {
            DashboardError::InvalidValue { column, reason, .. } => {
                assert_eq!(column, "date");
                assert_eq!(reason, "unrecognised date");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_error_row_number_points_at_bad_record() {
        let csv = "brand,content_type,date,impressions,reach,interactions\nA,Photo,2024-01-15,1,1,1\nA,Photo,2024-01-16,1,x,1\n";
        match read(csv).unwrap_err() {
            DashboardError::InvalidValue { row, .. } => assert_eq!(row, 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_ragged_rows_are_file_format_errors() {
        let csv = "brand,content_type,date,impressions,reach,interactions\nA,Photo,2024-01-15,1,1\n";
        assert_eq!(read(csv).unwrap_err().kind(), ErrorKind::FileFormat);
    }

    #[test]
    fn test_empty_and_binary_files() {
        assert_eq!(read("").unwrap_err().kind(), ErrorKind::FileFormat);
        assert_eq!(read(" \n\n").unwrap_err().kind(), ErrorKind::FileFormat);

        let binary = [0x00u8, 0x9F, 0x92, 0x96, 0xFF];
        let err = read_dataset(
            Period::Current,
            "x.bin",
            &binary,
            &BrandResolver::default(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileFormat);

        let utf16 = [0xFFu8, 0xFE, b'a', 0x00];
        let err = read_dataset(Period::Current, "x.csv", &utf16, &BrandResolver::default())
            .unwrap_err();
        assert!(err.to_string().contains("UTF-16"));
    }

    #[test]
    fn test_header_only_is_no_data() {
        let csv = "brand,content_type,date,impressions,reach,interactions\n";
        assert_eq!(read(csv).unwrap_err().kind(), ErrorKind::NoData);
    }

    #[test]
    fn test_blank_cells_fall_back_to_unknown_labels() {
        let csv = "brand,content_type,date,impressions,reach,interactions\n,,2024-01-15,1,1,1\n";
        let ds = read(csv).unwrap();
        assert_eq!(ds.rows[0].brand, UNKNOWN_BRAND);
        assert_eq!(ds.rows[0].content_type, UNKNOWN_CONTENT_TYPE);
    }

    #[test]
    fn test_brand_column_wins_over_account() {
        let csv = "brand,account,content_type,date,impressions,reach,interactions\nAcme,acme.kids,Story,2024-01-15,1,1,1\n";
        let ds = read(csv).unwrap();
        assert_eq!(ds.rows[0].brand, "Acme");
        assert_eq!(ds.rows[0].account, "acme.kids");
    }

    // ── read_pair / read_dataset_from_path ────────────────────────────────────

    #[test]
    fn test_read_pair_rejects_if_either_fails() {
        let bad = "brand,content_type,date,impressions,interactions\nA,Photo,2024-01-15,1,1\n";
        let err = read_pair(
            ("current.csv", CANONICAL.as_bytes()),
            ("prior.csv", bad.as_bytes()),
            &BrandResolver::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("prior"));
    }

    #[test]
    fn test_read_dataset_from_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prior_year.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{}", CANONICAL).unwrap();
        drop(file);

        let ds = read_dataset_from_path(Period::Prior, &path, &BrandResolver::default()).unwrap();
        assert_eq!(ds.source_name, "prior_year.csv");
        assert_eq!(ds.rows.len(), 3);
    }

    #[test]
    fn test_read_dataset_from_missing_path() {
        let dir = TempDir::new().unwrap();
        let err = read_dataset_from_path(
            Period::Prior,
            &dir.path().join("missing.csv"),
            &BrandResolver::default(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileFormat);
    }

    // ── helpers ───────────────────────────────────────────────────────────────

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("  Tipo de Publicação "), "tipo de publicacao");
        assert_eq!(normalize_header("Content_Type"), "content type");
        assert_eq!(normalize_header("Horário  de   publicação"), "horario de publicacao");
    }

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter("a,b,c\n1,2,3"), b',');
        assert_eq!(sniff_delimiter("a;b;c\n1;2;3"), b';');
        assert_eq!(sniff_delimiter("a\tb\tc\n"), b'\t');
        assert_eq!(sniff_delimiter("\n\na;b\n"), b';');
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("42"), Ok(42));
        assert_eq!(parse_count(" 7.0 "), Ok(7));
        assert_eq!(parse_count(""), Ok(0));
        assert!(parse_count("1e400").is_err());
        assert!(parse_count("-3").is_err());
        assert!(parse_count("1,234").is_err());
    }

    #[test]
    fn test_parse_count_large_integers_are_exact() {
        assert_eq!(parse_count("9007199254740993"), Ok(9_007_199_254_740_993));
        assert_eq!(parse_count("18446744073709551615"), Ok(u64::MAX));
        assert_eq!(parse_count("+5"), Ok(5));
        assert_eq!(
            parse_count("18446744073709551616"),
            Err("number is too large")
        );
        assert_eq!(
            parse_count("18446744073709551616.0"),
            Err("number is too large")
        );
        assert_eq!(parse_count("9007199254740993.0"), Err("number is too large"));
    }

    #[test]
    fn test_replies_plus_shares_overflow_rejected() {
        let csv = "brand,content_type,date,impressions,reach,replies,shares
A,Story,2024-01-15,1,1,18446744073709551615,1
";
        match read(csv).unwrap_err() {
            DashboardError::InvalidValue {
                row, column, reason, ..
            } => {
                assert_eq!(row, 1);
                assert_eq!(column, "shares");
                assert_eq!(reason, "number is too large");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_huge_counts_aggregate_without_overflow() {
        let csv = "brand,content_type,date,impressions,reach,interactions
A,Photo,2024-01-15,1,18446744073709551615,1
A,Photo,2024-01-16,1,18446744073709551615,1
";
        let ds = read(csv).unwrap();
        let out = crate::aggregator::EngagementAggregator::aggregate(
            &ds.rows,
            stories_core::models::Granularity::Monthly,
            stories_core::models::ZeroReachPolicy::Zero,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].totals.reach, u64::MAX);
        assert_eq!(out[0].totals.posts, 2);
    }
}
