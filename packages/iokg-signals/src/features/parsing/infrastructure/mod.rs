//! Line scanner for darshan-parser text dumps
//!
//! Single left-to-right pass. Section state is an explicit local value
//! threaded through the scan, and a section's namespace is sealed the
//! moment the next marker arrives: counter lines are keyed by the
//! *current* section, so a record id reappearing under a different
//! module lands in a separate bucket instead of merging.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::errors::{Result, SignalError};
use crate::features::parsing::domain::{ParseOptions, ParsedLog};
use crate::shared::models::{CounterValue, RecordKey, UNKNOWN};

static MOUNT_ENTRY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#\s*mount entry:\s*(\S+)\s+(\S+)").unwrap());

// Two marker shapes occur in the wild: "# Module: POSIX" and
// "# POSIX module data".
static SECTION_COLON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^#\s*module:\s*([A-Za-z0-9_+-]+)").unwrap());
static SECTION_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^#\s*([A-Za-z0-9_+-]+)\s+module(?:\s+data)?\s*$").unwrap());

/// Scan state for the single pass
#[derive(Debug, Default)]
struct ScanState {
    current_module: Option<String>,
}

/// Parse a full document into job metadata, mount table, and the
/// counter table. Individual malformed lines are skipped and counted;
/// only a missing header or a sectionless document is fatal.
pub fn scan(text: &str, opts: &ParseOptions) -> Result<ParsedLog> {
    let mut out = ParsedLog::default();
    let mut state = ScanState::default();

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('#') {
            if let Some(name) = section_marker(line) {
                debug!(module = %name, "entering module section");
                if !out.module_sections.iter().any(|m| m == &name) {
                    out.module_sections.push(name.clone());
                }
                state.current_module = Some(name);
            } else if let Some(caps) = MOUNT_ENTRY.captures(line) {
                out.mounts.insert(&caps[1], &caps[2]);
            } else {
                parse_header_field(line, &mut out);
            }
            continue;
        }

        if !consume_data_line(line, &state, opts, &mut out) {
            out.skipped_lines += 1;
        }
    }

    if out.job.is_empty() {
        return Err(SignalError::MissingHeader);
    }
    if out.module_sections.is_empty() {
        return Err(SignalError::EmptyDocument);
    }

    debug!(
        records = out.counters.len(),
        sections = out.module_sections.len(),
        skipped = out.skipped_lines,
        "scan complete"
    );
    Ok(out)
}

fn section_marker(line: &str) -> Option<String> {
    if let Some(caps) = SECTION_COLON.captures(line) {
        return Some(caps[1].to_uppercase());
    }
    SECTION_SUFFIX
        .captures(line)
        .map(|caps| caps[1].to_uppercase())
}

fn parse_header_field(line: &str, out: &mut ParsedLog) {
    let job = &mut out.job;

    if let Some(v) = header_value(line, "# jobid:") {
        job.job_id = Some(v.to_string());
    } else if let Some(v) = header_value(line, "# uid:") {
        job.uid = v.parse().ok();
    } else if let Some(v) = header_value(line, "# nprocs:") {
        job.nprocs = v.parse().ok();
    } else if let Some(v) = header_value(line, "# run time:") {
        job.runtime = v.parse().ok();
    } else if let Some(v) = header_value(line, "# start_time:") {
        job.start_time = v.parse().ok();
    } else if let Some(v) = header_value(line, "# end_time:") {
        job.end_time = v.parse().ok();
    } else if let Some(v) = header_value(line, "# exe:") {
        job.exe = Some(v.to_string());
    } else if let Some(v) = header_value(line, "# darshan log version:") {
        job.log_version = Some(v.to_string());
    }
}

fn header_value<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    line.strip_prefix(prefix).map(str::trim)
}

/// Returns false when the line could not be attributed and parsed
fn consume_data_line(
    line: &str,
    state: &ScanState,
    opts: &ParseOptions,
    out: &mut ParsedLog,
) -> bool {
    let Some(module) = state.current_module.as_deref() else {
        warn!("data line outside any module section");
        return false;
    };

    let parts: Vec<&str> = line.split('\t').collect();
    if parts.len() < 5 {
        return false;
    }

    let Ok(rank) = parts[1].trim().parse::<i64>() else {
        return false;
    };
    let record_id = parts[2].trim();
    let counter = parts[3].trim();
    let Some(value) = classify_value(counter, parts[4].trim(), opts) else {
        return false;
    };

    if parts[0].trim() != module {
        debug!(
            declared = parts[0].trim(),
            section = module,
            "module column disagrees with enclosing section; section wins"
        );
    }

    // Resolve sidecar before borrowing the table entry
    let sidecar = (parts.len() >= 8).then(|| {
        let file_name = parts[5].trim().to_string();
        let mut mount_pt = parts[6].trim().to_string();
        let mut fs_type = parts[7].trim().to_string();
        if (mount_pt == UNKNOWN || fs_type == UNKNOWN) && file_name != UNKNOWN {
            if let Some((mnt, fs)) = out.mounts.resolve(&file_name) {
                if mount_pt == UNKNOWN {
                    mount_pt = mnt.to_string();
                }
                if fs_type == UNKNOWN {
                    fs_type = fs.to_string();
                }
            }
        }
        (file_name, mount_pt, fs_type)
    });

    let key = RecordKey::new(module, rank, record_id);
    let entry = out.counters.entry_mut(key);

    // First sidecar wins for a given record
    if let Some((file_name, mount_pt, fs_type)) = sidecar {
        if entry.meta.file_name == UNKNOWN {
            entry.meta.file_name = file_name;
            entry.meta.mount_pt = mount_pt;
            entry.meta.fs_type = fs_type;
        }
    }

    if entry.counters.insert(counter.to_string(), value).is_some() {
        warn!(counter, module, rank, record_id, "duplicate counter line overwrote prior value");
    }
    true
}

fn classify_value(counter: &str, token: &str, opts: &ParseOptions) -> Option<CounterValue> {
    if let Ok(i) = token.parse::<i64>() {
        if (opts.unmonitored)(counter, i) {
            return Some(CounterValue::Unmonitored);
        }
        return Some(CounterValue::Int(i));
    }
    token.parse::<f64>().ok().map(CounterValue::Float)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::Fetched;

    const MINIMAL: &str = "\
# darshan log version: 3.40
# exe: /usr/bin/ior
# uid: 1001
# jobid: 42
# nprocs: 4
# run time: 120.5
# start_time: 1700000000
# end_time: 1700000120
# mount entry: /scratch lustre
# mount entry: /home nfs
# POSIX module data
POSIX\t0\trecA\tPOSIX_READS\t2\t/scratch/a.dat\t/scratch\tlustre
POSIX\t0\trecA\tPOSIX_BYTES_READ\t1198\t/scratch/a.dat\t/scratch\tlustre
# STDIO module data
STDIO\t0\trecA\tSTDIO_WRITES\t5\t/home/log.txt\t/home\tnfs
";

    #[test]
    fn test_header_and_mounts() {
        let parsed = scan(MINIMAL, &ParseOptions::default()).unwrap();
        assert_eq!(parsed.job.job_id.as_deref(), Some("42"));
        assert_eq!(parsed.job.uid, Some(1001));
        assert_eq!(parsed.job.nprocs, Some(4));
        assert_eq!(parsed.job.runtime, Some(120.5));
        assert_eq!(parsed.job.exe.as_deref(), Some("/usr/bin/ior"));
        assert_eq!(parsed.mounts.get("/scratch"), Some("lustre"));
        assert_eq!(parsed.mounts.len(), 2);
    }

    #[test]
    fn test_sections_seal_namespaces() {
        let parsed = scan(MINIMAL, &ParseOptions::default()).unwrap();
        assert_eq!(parsed.module_sections, vec!["POSIX", "STDIO"]);

        // recA appears under both modules: two independent buckets
        let posix = parsed
            .counters
            .get(&RecordKey::new("POSIX", 0, "recA"))
            .unwrap();
        let stdio = parsed
            .counters
            .get(&RecordKey::new("STDIO", 0, "recA"))
            .unwrap();
        assert_eq!(posix.fetch("POSIX_READS"), Fetched::Value(2.0));
        assert_eq!(posix.fetch("STDIO_WRITES"), Fetched::Missing);
        assert_eq!(stdio.fetch("STDIO_WRITES"), Fetched::Value(5.0));
        assert_eq!(stdio.fetch("POSIX_READS"), Fetched::Missing);
    }

    #[test]
    fn test_sidecar_metadata_attached() {
        let parsed = scan(MINIMAL, &ParseOptions::default()).unwrap();
        let posix = parsed
            .counters
            .get(&RecordKey::new("POSIX", 0, "recA"))
            .unwrap();
        assert_eq!(posix.meta.file_name, "/scratch/a.dat");
        assert_eq!(posix.meta.mount_pt, "/scratch");
        assert_eq!(posix.meta.fs_type, "lustre");
    }

    #[test]
    fn test_mount_inference_for_unknown_sidecar() {
        let doc = "\
# jobid: 7
# mount entry: /scratch lustre
# POSIX module data
POSIX\t0\trecB\tPOSIX_READS\t1\t/scratch/deep/file.h5\tUNKNOWN\tUNKNOWN
";
        let parsed = scan(doc, &ParseOptions::default()).unwrap();
        let rec = parsed
            .counters
            .get(&RecordKey::new("POSIX", 0, "recB"))
            .unwrap();
        assert_eq!(rec.meta.mount_pt, "/scratch");
        assert_eq!(rec.meta.fs_type, "lustre");
    }

    #[test]
    fn test_unmonitored_sentinel_not_minus_one() {
        let doc = "\
# jobid: 7
# POSIX module data
POSIX\t0\trecC\tPOSIX_SEQ_READS\t-1\t/f\t/\tx
";
        let parsed = scan(doc, &ParseOptions::default()).unwrap();
        let rec = parsed
            .counters
            .get(&RecordKey::new("POSIX", 0, "recC"))
            .unwrap();
        assert_eq!(rec.fetch("POSIX_SEQ_READS"), Fetched::Unmonitored);
    }

    #[test]
    fn test_custom_sentinel_predicate() {
        let opts = ParseOptions {
            // Only SEQ counters use the sentinel
            unmonitored: |counter, v| v == -1 && counter.contains("SEQ"),
            ..Default::default()
        };
        let doc = "\
# jobid: 7
# POSIX module data
POSIX\t0\tr\tPOSIX_SEQ_READS\t-1
POSIX\t0\tr\tPOSIX_MEM_ALIGNMENT\t-1
";
        let parsed = scan(doc, &opts).unwrap();
        let rec = parsed.counters.get(&RecordKey::new("POSIX", 0, "r")).unwrap();
        assert_eq!(rec.fetch("POSIX_SEQ_READS"), Fetched::Unmonitored);
        assert_eq!(rec.fetch("POSIX_MEM_ALIGNMENT"), Fetched::Value(-1.0));
    }

    #[test]
    fn test_malformed_lines_are_counted_not_fatal() {
        let doc = "\
# jobid: 7
# POSIX module data
garbage line without tabs
POSIX\t0\trecD\tPOSIX_READS\tnot_a_number
POSIX\tzero\trecD\tPOSIX_READS\t3
POSIX\t0\trecD\tPOSIX_READS\t3
";
        let parsed = scan(doc, &ParseOptions::default()).unwrap();
        assert_eq!(parsed.skipped_lines, 3);
        assert_eq!(parsed.counters.len(), 1);
    }

    #[test]
    fn test_data_before_any_section_is_skipped() {
        let doc = "\
# jobid: 7
POSIX\t0\trecE\tPOSIX_READS\t3
# POSIX module data
POSIX\t0\trecE\tPOSIX_WRITES\t4
";
        let parsed = scan(doc, &ParseOptions::default()).unwrap();
        assert_eq!(parsed.skipped_lines, 1);
        let rec = parsed
            .counters
            .get(&RecordKey::new("POSIX", 0, "recE"))
            .unwrap();
        assert_eq!(rec.fetch("POSIX_READS"), Fetched::Missing);
        assert_eq!(rec.fetch("POSIX_WRITES"), Fetched::Value(4.0));
    }

    #[test]
    fn test_missing_header_is_fatal() {
        let doc = "# POSIX module data\nPOSIX\t0\tr\tPOSIX_READS\t3\n";
        assert!(matches!(
            scan(doc, &ParseOptions::default()),
            Err(SignalError::MissingHeader)
        ));
    }

    #[test]
    fn test_empty_document_is_fatal() {
        let doc = "# jobid: 42\n# nprocs: 4\n";
        assert!(matches!(
            scan(doc, &ParseOptions::default()),
            Err(SignalError::EmptyDocument)
        ));
    }

    #[test]
    fn test_module_colon_marker_form() {
        let doc = "# jobid: 1\n# Module: MPIIO\nMPIIO\t-1\tr\tMPIIO_BYTES_READ\t10\n";
        let parsed = scan(doc, &ParseOptions::default()).unwrap();
        assert_eq!(parsed.module_sections, vec!["MPIIO"]);
    }
}
