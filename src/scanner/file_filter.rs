use crate::config::ScanConfig;
use regex::Regex;
use std::path::Path;

pub struct FileFilter {
    extensions: Vec<String>,
    max_file_size: u64,
    exclude_dirs: Vec<String>,
    exclude_patterns: Vec<Regex>,
}

impl FileFilter {
    pub fn new(config: &ScanConfig) -> Self {
        let exclude_patterns = config
            .exclude_patterns
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect();

        Self {
            extensions: config
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
            max_file_size: config.max_file_size,
            exclude_dirs: config.exclude_dirs.clone(),
            exclude_patterns,
        }
    }

    /// True for files whose extension is in the configured list (case-insensitive).
    pub fn is_candidate_file(&self, path: &Path) -> bool {
        let Some(extension) = path.extension().and_then(|s| s.to_str()) else {
            return false;
        };

        if !self.extensions.contains(&extension.to_lowercase()) {
            return false;
        }

        !self.matches_any_pattern(&path.to_string_lossy())
    }

    pub fn should_traverse_directory(&self, path: &Path) -> bool {
        let Some(dir_name) = path.file_name().and_then(|s| s.to_str()) else {
            return true;
        };
        let dir_name_lower = dir_name.to_lowercase();

        if self
            .exclude_dirs
            .iter()
            .any(|exclude| exclude.to_lowercase() == dir_name_lower)
        {
            return false;
        }

        !self.matches_any_pattern(&path.to_string_lossy())
    }

    pub fn is_size_allowed(&self, size: u64) -> bool {
        size <= self.max_file_size
    }

    pub fn get_extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn get_max_file_size(&self) -> u64 {
        self.max_file_size
    }

    pub fn matches_any_pattern(&self, text: &str) -> bool {
        self.exclude_patterns
            .iter()
            .any(|pattern| pattern.is_match(text))
    }
}

impl Default for FileFilter {
    fn default() -> Self {
        Self::new(&ScanConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> ScanConfig {
        ScanConfig {
            extensions: vec!["xml".to_string()],
            max_file_size: 1024 * 1024, // 1MB
            max_depth: 10,
            exclude_dirs: vec![".git".to_string(), "backup".to_string()],
            exclude_patterns: vec![r".*_cancelado\.xml$".to_string()],
        }
    }

    #[test]
    fn test_candidate_file_detection() {
        let filter = FileFilter::new(&create_test_config());

        assert!(filter.is_candidate_file(Path::new("2024/enero/recibo.xml")));
        assert!(filter.is_candidate_file(Path::new("RECIBO.XML")));
        assert!(filter.is_candidate_file(Path::new("recibo.Xml")));

        assert!(!filter.is_candidate_file(Path::new("recibo.pdf")));
        assert!(!filter.is_candidate_file(Path::new("recibo.xml.bak")));
        assert!(!filter.is_candidate_file(Path::new("xml")));
        assert!(!filter.is_candidate_file(Path::new("notes.txt")));
    }

    #[test]
    fn test_exclude_patterns_apply_to_files() {
        let filter = FileFilter::new(&create_test_config());

        assert!(!filter.is_candidate_file(Path::new("2024/recibo_cancelado.xml")));
        assert!(filter.matches_any_pattern("a_cancelado.xml"));
        assert!(!filter.matches_any_pattern("a.xml"));
    }

    #[test]
    fn test_directory_traversal_rules() {
        let filter = FileFilter::new(&create_test_config());

        assert!(filter.should_traverse_directory(Path::new("2024")));
        assert!(filter.should_traverse_directory(Path::new("data/enero")));

        assert!(!filter.should_traverse_directory(Path::new(".git")));
        assert!(!filter.should_traverse_directory(Path::new("Backup")));
        assert!(filter.should_traverse_directory(Path::new(".cache")));
    }

    #[test]
    fn test_default_filter_traverses_every_directory() {
        let filter = FileFilter::default();

        for dir in ["target", "node_modules", ".git", ".hist", "2024"] {
            assert!(filter.should_traverse_directory(Path::new(dir)), "{dir}");
        }
    }

    #[test]
    fn test_extensions_are_normalized() {
        let mut config = create_test_config();
        config.extensions = vec![".XML".to_string()];
        let filter = FileFilter::new(&config);

        assert_eq!(filter.get_extensions(), ["xml".to_string()]);
        assert!(filter.is_candidate_file(Path::new("recibo.xml")));
    }

    #[test]
    fn test_size_limits() {
        let filter = FileFilter::new(&create_test_config());

        assert!(filter.is_size_allowed(1024));
        assert!(filter.is_size_allowed(1024 * 1024));
        assert!(!filter.is_size_allowed(2 * 1024 * 1024));
        assert_eq!(filter.get_max_file_size(), 1024 * 1024);
    }
}
