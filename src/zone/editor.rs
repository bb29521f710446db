use super::{Result, ZoneError, constants, line};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Editor for a single BIND-style zone file.
///
/// Holds the file as an ordered sequence of lines. Every operation leaves
/// lines it does not target byte-identical and in their original order;
/// only the matched record line and the serial line are rewritten.
///
/// The editor owns the document for the duration of one invocation: load,
/// mutate, save. The file on disk is the sole durable state.
#[derive(Debug)]
pub struct ZoneEditor {
    /// Path the zone file was read from and will be written back to
    path: PathBuf,
    /// Zone file contents, one entry per line, newline-stripped
    lines: Vec<String>,
}

impl ZoneEditor {
    /// Derive the zone file path for a domain under `zone_dir`.
    pub fn zone_path(zone_dir: &Path, domain: &str) -> PathBuf {
        zone_dir.join(format!("{}.{}", domain, constants::ZONE_FILE_EXTENSION))
    }

    /// Load the zone file for `domain` from `zone_dir`.
    pub fn load(zone_dir: &Path, domain: &str) -> Result<Self> {
        Self::load_path(Self::zone_path(zone_dir, domain))
    }

    /// Load a zone file from an explicit path.
    pub fn load_path<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();
        let contents = fs::read_to_string(&path)
            .map_err(|e| ZoneError::Io(format!("{}: {}", path.display(), e)))?;

        if contents.len() > constants::MAX_ZONE_FILE_SIZE {
            return Err(ZoneError::FileTooLarge);
        }

        let lines: Vec<String> = contents.lines().map(str::to_string).collect();
        debug!("Loaded {} lines from {}", lines.len(), path.display());

        Ok(Self { path, lines })
    }

    /// Insert or update the challenge TXT record for `owner`.
    ///
    /// The first line belonging to `owner` is replaced in place, keeping
    /// its position in the file; any further matches are dropped. If no
    /// line matches, the new record is appended. Bumps the serial.
    pub fn upsert_txt(&mut self, owner: &str, token: &str) -> Result<()> {
        let record = line::format_txt_record(owner, token);
        let mut replaced = false;

        self.lines.retain_mut(|l| {
            if !line::matches_owner(l, owner) {
                return true;
            }
            if replaced {
                false
            } else {
                *l = record.clone();
                replaced = true;
                true
            }
        });

        if !replaced {
            self.lines.push(record);
        }

        info!("Set TXT record for {}", owner);
        self.increment_serial()
    }

    /// Replace the challenge TXT record, appending the fresh line at the
    /// end of the file.
    ///
    /// Unlike [`ZoneEditor::upsert_txt`] this does not keep the record's
    /// original position: every matching line is dropped and one canonical
    /// line is appended. Bumps the serial.
    pub fn force_replace_txt(&mut self, owner: &str, token: &str) -> Result<()> {
        self.lines.retain(|l| !line::matches_owner(l, owner));
        self.lines.push(line::format_txt_record(owner, token));

        info!("Re-registered TXT record for {}", owner);
        self.increment_serial()
    }

    /// Remove every challenge TXT record line for `owner`.
    ///
    /// Removing a record that does not exist is not an error; the serial
    /// is bumped either way so secondaries still see a zone change.
    pub fn delete_txt(&mut self, owner: &str) -> Result<()> {
        let before = self.lines.len();
        self.lines.retain(|l| !line::matches_owner(l, owner));

        if self.lines.len() == before {
            debug!("No TXT record for {} to remove", owner);
        } else {
            info!("Removed TXT record for {}", owner);
        }

        self.increment_serial()
    }

    /// Bump the SOA serial number by one.
    ///
    /// The serial is the first whitespace-delimited token of the line
    /// immediately following the first line containing the SOA marker.
    /// That line is rewritten; the rest of the file is untouched.
    pub fn increment_serial(&mut self) -> Result<()> {
        let soa_idx = self
            .lines
            .iter()
            .position(|l| line::is_soa(l))
            .ok_or(ZoneError::MissingSoa)?;

        let serial_line = self.lines.get(soa_idx + 1).ok_or(ZoneError::MissingSoa)?;
        let serial = line::parse_serial(serial_line)
            .ok_or_else(|| ZoneError::InvalidSerial(serial_line.trim().to_string()))?;

        self.lines[soa_idx + 1] = line::format_serial_line(serial + 1);
        debug!("Serial {} -> {}", serial, serial + 1);

        Ok(())
    }

    /// Write the line sequence back to the original path.
    ///
    /// Plain overwrite, no atomic rename; this tool assumes a single
    /// writer serialized by the caller.
    pub fn save(&self) -> Result<()> {
        let mut contents = self.lines.join("\n");
        contents.push('\n');

        fs::write(&self.path, contents)
            .map_err(|e| ZoneError::Io(format!("{}: {}", self.path.display(), e)))?;

        info!("Wrote zone file {}", self.path.display());
        Ok(())
    }

    /// Path this editor reads from and writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current line sequence.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: &str = "_acme-challenge.example.com";

    fn sample_zone() -> Vec<String> {
        vec![
            "$TTL 3600".to_string(),
            "@       IN      SOA     ns1.example.com. admin.example.com. (".to_string(),
            "                        5      ; Serial number".to_string(),
            "                        3600           ; Refresh".to_string(),
            "                        900            ; Retry".to_string(),
            "                        1209600        ; Expire".to_string(),
            "                        3600 )         ; Negative cache TTL".to_string(),
            "@       IN      NS      ns1.example.com.".to_string(),
            "www     IN      A       192.0.2.10".to_string(),
        ]
    }

    fn editor_with(lines: Vec<String>) -> ZoneEditor {
        ZoneEditor {
            path: PathBuf::from("/nonexistent/example.com.zone"),
            lines,
        }
    }

    fn serial_of(editor: &ZoneEditor) -> u32 {
        let soa_idx = editor.lines.iter().position(|l| line::is_soa(l)).unwrap();
        line::parse_serial(&editor.lines[soa_idx + 1]).unwrap()
    }

    fn owner_lines(editor: &ZoneEditor) -> Vec<&String> {
        editor
            .lines
            .iter()
            .filter(|l| line::matches_owner(l, OWNER))
            .collect()
    }

    #[test]
    fn test_upsert_appends_when_missing() {
        let mut editor = editor_with(sample_zone());
        editor.upsert_txt(OWNER, "tok1").unwrap();

        let matches = owner_lines(&editor);
        assert_eq!(matches.len(), 1);
        assert_eq!(
            matches[0],
            "_acme-challenge.example.com. IN TXT \"tok1\""
        );
        // Appended at the end
        assert_eq!(editor.lines.last().unwrap(), matches[0]);
        assert_eq!(serial_of(&editor), 6);
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut lines = sample_zone();
        lines.insert(8, format!("{}. IN TXT \"old\"", OWNER));
        let mut editor = editor_with(lines);

        editor.upsert_txt(OWNER, "new").unwrap();

        let matches = owner_lines(&editor);
        assert_eq!(matches.len(), 1);
        assert!(matches[0].contains("\"new\""));
        // Position preserved: still before the www A record
        assert_eq!(
            editor.lines[8],
            "_acme-challenge.example.com. IN TXT \"new\""
        );
        assert_eq!(editor.lines[9], "www     IN      A       192.0.2.10");
    }

    #[test]
    fn test_upsert_twice_keeps_single_record() {
        let mut editor = editor_with(sample_zone());
        editor.upsert_txt(OWNER, "first").unwrap();
        editor.upsert_txt(OWNER, "second").unwrap();

        let matches = owner_lines(&editor);
        assert_eq!(matches.len(), 1);
        assert!(matches[0].contains("\"second\""));
        assert!(!editor.lines.iter().any(|l| l.contains("\"first\"")));
        assert_eq!(serial_of(&editor), 7);
    }

    #[test]
    fn test_upsert_collapses_duplicate_lines() {
        let mut lines = sample_zone();
        lines.push(format!("{}. IN TXT \"a\"", OWNER));
        lines.push(format!("{}. IN TXT \"b\"", OWNER));
        let mut editor = editor_with(lines);

        editor.upsert_txt(OWNER, "c").unwrap();

        assert_eq!(owner_lines(&editor).len(), 1);
    }

    #[test]
    fn test_force_replace_moves_record_to_end() {
        let mut lines = sample_zone();
        lines.insert(8, format!("{}. IN TXT \"old\"", OWNER));
        let mut editor = editor_with(lines);

        editor.force_replace_txt(OWNER, "fresh").unwrap();

        let matches = owner_lines(&editor);
        assert_eq!(matches.len(), 1);
        assert_eq!(
            editor.lines.last().unwrap(),
            "_acme-challenge.example.com. IN TXT \"fresh\""
        );
        assert!(!editor.lines.iter().any(|l| l.contains("\"old\"")));
    }

    #[test]
    fn test_delete_removes_record() {
        let mut lines = sample_zone();
        lines.push(format!("{}. IN TXT \"tok\"", OWNER));
        let mut editor = editor_with(lines);

        editor.delete_txt(OWNER).unwrap();

        assert!(owner_lines(&editor).is_empty());
        assert_eq!(serial_of(&editor), 6);
    }

    #[test]
    fn test_delete_missing_record_still_bumps_serial() {
        let mut editor = editor_with(sample_zone());
        let before = editor.lines.clone();

        editor.delete_txt(OWNER).unwrap();

        assert_eq!(serial_of(&editor), 6);
        // Everything except the serial line is untouched
        for (i, l) in editor.lines.iter().enumerate() {
            if i == 2 {
                continue;
            }
            assert_eq!(l, &before[i]);
        }
    }

    #[test]
    fn test_delete_ignores_longer_owner_with_shared_prefix() {
        let mut lines = sample_zone();
        lines.push("_acme-challenge.example.company. IN TXT \"keep\"".to_string());
        let mut editor = editor_with(lines);

        editor.delete_txt(OWNER).unwrap();

        assert!(
            editor
                .lines
                .iter()
                .any(|l| l.contains("_acme-challenge.example.company."))
        );
    }

    #[test]
    fn test_serial_monotonicity() {
        let mut editor = editor_with(sample_zone());
        editor.upsert_txt(OWNER, "a").unwrap();
        editor.force_replace_txt(OWNER, "b").unwrap();
        editor.delete_txt(OWNER).unwrap();
        editor.delete_txt(OWNER).unwrap();

        assert_eq!(serial_of(&editor), 9);
    }

    #[test]
    fn test_non_target_lines_preserved() {
        let mut lines = sample_zone();
        lines.push("; trailing comment".to_string());
        let mut editor = editor_with(lines.clone());

        editor.upsert_txt(OWNER, "tok").unwrap();

        // Original lines minus the serial line are byte-identical, in order
        let kept: Vec<&String> = editor
            .lines
            .iter()
            .filter(|l| !line::matches_owner(l, OWNER))
            .collect();
        for (i, original) in lines.iter().enumerate() {
            if i == 2 {
                continue;
            }
            assert_eq!(kept[i], original);
        }
    }

    #[test]
    fn test_missing_soa_is_fatal() {
        let mut editor = editor_with(vec![
            "$TTL 3600".to_string(),
            "www     IN      A       192.0.2.10".to_string(),
        ]);
        let before = editor.lines.clone();

        let err = editor.upsert_txt(OWNER, "tok").unwrap_err();
        assert!(matches!(err, ZoneError::MissingSoa));

        // Failed mutation is never written back; in-memory record line is
        // irrelevant because save() is only reached on success
        assert!(editor.lines.starts_with(&before));
    }

    #[test]
    fn test_soa_on_last_line_is_fatal() {
        let mut editor = editor_with(vec![
            "@       IN      SOA     ns1.example.com. admin.example.com. (".to_string(),
        ]);
        let err = editor.increment_serial().unwrap_err();
        assert!(matches!(err, ZoneError::MissingSoa));
    }

    #[test]
    fn test_unparsable_serial_is_fatal() {
        let mut editor = editor_with(vec![
            "@       IN      SOA     ns1.example.com. admin.example.com. (".to_string(),
            "                        not-a-number   ; Serial number".to_string(),
        ]);
        let err = editor.increment_serial().unwrap_err();
        assert!(matches!(err, ZoneError::InvalidSerial(_)));
    }

    #[test]
    fn test_zone_path() {
        let path = ZoneEditor::zone_path(Path::new("/etc/bind/zones"), "example.com");
        assert_eq!(path, PathBuf::from("/etc/bind/zones/example.com.zone"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ZoneEditor::load(Path::new("/nonexistent"), "example.com").unwrap_err();
        assert!(matches!(err, ZoneError::Io(_)));
    }
}
