/// Cleans up parsed game title
pub fn clean_game_title(title: impl AsRef<str>) -> String {
    title.as_ref().replace(['™', '®'], "").trim().to_string()
}

/// Truncates a string to at most `max_width` characters, marking the cut with an ellipsis
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        return s.to_string();
    }

    let mut truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    if max_width > 0 {
        truncated.push('…');
    }
    truncated
}

#[cfg(test)]
pub mod test {
    use test_case::test_case;

    use super::*;

    #[test_case("Soon™", "Soon")]
    #[test_case("Game®", "Game")]
    #[test_case("®T™i®t™l®e™", "Title")]
    #[test_case("Portal 2 ", "Portal 2")]
    fn test_clean_game_title(dirty: &str, clean: &str) {
        assert_eq!(clean_game_title(dirty), String::from(clean));
    }

    #[test_case("Terraria", 20, "Terraria")]
    #[test_case("Terraria", 8, "Terraria")]
    #[test_case("Terraria", 5, "Terr…")]
    #[test_case("Terraria", 0, "")]
    fn test_truncate_to_width(s: &str, width: usize, expected: &str) {
        assert_eq!(truncate_to_width(s, width), expected);
    }
}
