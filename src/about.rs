pub const PLATE_DISPLAY_VERSION: &str = env!("PLATE_DISPLAY_VERSION");
pub const PLATE_BUILD_N: &str = env!("PLATE_BUILD_N");

pub fn version_cli_text() -> String {
    format!(
        "Plate Planner {}\nBuild {}\n96-well plate layout planner",
        PLATE_DISPLAY_VERSION, PLATE_BUILD_N
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_text_mentions_build() {
        let text = version_cli_text();
        assert!(text.starts_with("Plate Planner "));
        assert!(text.contains(&format!("Build {PLATE_BUILD_N}")));
    }
}
