/// Returns `contents` with `key` in `[section]` set to `value`.
///
/// Section and key names match case-insensitively. An existing key keeps its
/// position; a new key goes after the last line of its section; a missing
/// section is appended. The file's line ending style is preserved.
pub fn set_ini_value(contents: &str, section: &str, key: &str, value: &str) -> String {
    let newline = if contents.contains("\r\n") { "\r\n" } else { "\n" };
    let mut lines: Vec<String> = contents.lines().map(str::to_string).collect();
    let entry = format!("{}={}", key, value);

    let mut in_section = false;
    let mut section_end = None;
    for (index, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if let Some(name) = section_name(trimmed) {
            in_section = name.eq_ignore_ascii_case(section);
            if in_section {
                section_end = Some(index + 1);
            }
            continue;
        }
        if !in_section {
            continue;
        }
        if key_name(trimmed).is_some_and(|name| name.eq_ignore_ascii_case(key)) {
            lines[index] = entry;
            return join(lines, newline);
        }
        if !trimmed.is_empty() {
            section_end = Some(index + 1);
        }
    }

    match section_end {
        Some(position) => lines.insert(position, entry),
        None => {
            if lines.last().is_some_and(|line| !line.trim().is_empty()) {
                lines.push(String::new());
            }
            lines.push(format!("[{}]", section));
            lines.push(entry);
        }
    }
    join(lines, newline)
}

fn section_name(line: &str) -> Option<&str> {
    line.strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .map(str::trim)
}

fn key_name(line: &str) -> Option<&str> {
    if line.starts_with(';') || line.starts_with('#') {
        return None;
    }
    line.split_once('=').map(|(name, _)| name.trim())
}

fn join(lines: Vec<String>, newline: &str) -> String {
    let mut text = lines.join(newline);
    text.push_str(newline);
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn replaces_existing_key_in_place() {
        let before = "[Graphics]\nQuality=Low\nVsync=1\n";
        assert_eq!(
            set_ini_value(before, "graphics", "quality", "High"),
            "[Graphics]\nquality=High\nVsync=1\n"
        );
    }

    #[test]
    fn appends_key_at_end_of_section() {
        let before = "[Graphics]\nQuality=Low\n\n[Audio]\nVolume=5\n";
        assert_eq!(
            set_ini_value(before, "Graphics", "Vsync", "0"),
            "[Graphics]\nQuality=Low\nVsync=0\n\n[Audio]\nVolume=5\n"
        );
    }

    #[test]
    fn creates_missing_section() {
        assert_eq!(
            set_ini_value("[Audio]\nVolume=5\n", "Mods", "Enabled", "true"),
            "[Audio]\nVolume=5\n\n[Mods]\nEnabled=true\n"
        );
        assert_eq!(set_ini_value("", "Mods", "Enabled", "true"), "[Mods]\nEnabled=true\n");
    }

    #[test]
    fn keeps_windows_line_endings_and_skips_comments() {
        let before = "[Mods]\r\n; Enabled=false\r\n";
        assert_eq!(
            set_ini_value(before, "Mods", "Enabled", "true"),
            "[Mods]\r\n; Enabled=false\r\nEnabled=true\r\n"
        );
    }
}
