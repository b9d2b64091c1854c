use crate::core::{Category, CategoryFilter, ModuleRecord};
use crate::utils::error::{Result, SiteError};
use std::collections::HashSet;
use std::path::Path;

const BUILTIN_CATALOG: &str = include_str!("../../data/modules.json");

/// 功能模組目錄，載入後不再修改，順序即顯示順序
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    records: Vec<ModuleRecord>,
}

impl Catalog {
    /// 內建目錄（編譯時嵌入 `data/modules.json`）
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_CATALOG)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SiteError::IoError)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let records: Vec<ModuleRecord> = serde_json::from_str(content)?;
        Self::new(records)
    }

    pub fn new(records: Vec<ModuleRecord>) -> Result<Self> {
        let mut seen = HashSet::new();
        for record in &records {
            if record.id.trim().is_empty() {
                return Err(SiteError::validation(format!(
                    "Module '{}' has an empty id",
                    record.title
                )));
            }
            if !seen.insert(record.id.as_str()) {
                return Err(SiteError::validation(format!(
                    "Duplicate module id '{}' in catalog",
                    record.id
                )));
            }
        }

        tracing::debug!("Loaded module catalog with {} records", records.len());
        Ok(Self { records })
    }

    pub fn records(&self) -> &[ModuleRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ModuleRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// 各分類的模組數量，依 `Category::ALL` 順序
    pub fn category_counts(&self) -> Vec<(Category, usize)> {
        Category::ALL
            .into_iter()
            .map(|category| {
                let count = self
                    .records
                    .iter()
                    .filter(|record| record.category == category)
                    .count();
                (category, count)
            })
            .collect()
    }

    pub fn filter(&self, filter: CategoryFilter, search_term: &str) -> Vec<&ModuleRecord> {
        filter_modules(&self.records, filter, search_term)
    }
}

/// 分類與搜尋字詞同時成立才保留（AND），保持原始順序。
///
/// 搜尋不分大小寫，比對標題或描述的子字串；空字串視為全部符合。
/// 沒有結果時回傳空 Vec，不是錯誤。
pub fn filter_modules<'a>(
    records: &'a [ModuleRecord],
    filter: CategoryFilter,
    search_term: &str,
) -> Vec<&'a ModuleRecord> {
    let needle = search_term.to_lowercase();

    records
        .iter()
        .filter(|record| filter.matches(record.category))
        .filter(|record| {
            needle.is_empty()
                || record.title.to_lowercase().contains(&needle)
                || record.description.to_lowercase().contains(&needle)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn record(id: &str, title: &str, category: Category, description: &str) -> ModuleRecord {
        ModuleRecord {
            id: id.to_string(),
            title: title.to_string(),
            category,
            description: description.to_string(),
            features: vec![],
            benefits: vec![],
            icon: "📦".to_string(),
        }
    }

    fn sample_catalog() -> Catalog {
        Catalog::new(vec![
            record(
                "diretoria",
                "Gerenciamento da Diretoria",
                Category::Gestao,
                "Controle de mandatos",
            ),
            record(
                "doadores",
                "Gestão de Doadores",
                Category::Financeiro,
                "CRM de relacionamento",
            ),
            record(
                "beneficiarios",
                "Gestão de Beneficiários",
                Category::Social,
                "Cadastro de público atendido",
            ),
            record(
                "editais",
                "Monitoramento de Editais",
                Category::Inovacao,
                "Alertas de oportunidades para doadores",
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = Catalog::builtin().unwrap();

        assert_eq!(catalog.len(), 25);
        assert_eq!(catalog.records()[0].id, "diretoria");
        let doadores = catalog.get("doadores").unwrap();
        assert_eq!(doadores.title, "Gestão de Doadores");
        assert_eq!(doadores.category, Category::Financeiro);

        let total: usize = catalog.category_counts().iter().map(|(_, n)| n).sum();
        assert_eq!(total, 25);
        assert!(catalog.category_counts().iter().all(|(_, n)| *n > 0));
    }

    #[test]
    fn test_catalog_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(
                r#"[{
                    "id": "oficinas",
                    "title": "Agenda de Oficinas",
                    "category": "Social",
                    "description": "Inscrições e presença",
                    "features": ["Lista de espera"],
                    "benefits": ["Menos planilhas"],
                    "icon": "🎭"
                }]"#
                .as_bytes(),
            )
            .unwrap();

        let catalog = Catalog::from_file(temp_file.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("oficinas").unwrap().category, Category::Social);
        assert!(!catalog.contains("doadores"));
    }

    #[test]
    fn test_catalog_from_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Catalog::from_file(dir.path().join("modules.json"));
        assert!(matches!(result, Err(SiteError::IoError(_))));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = Catalog::new(vec![
            record("a", "A", Category::Social, ""),
            record("a", "B", Category::Social, ""),
        ]);
        assert!(matches!(result, Err(SiteError::ValidationError { .. })));
    }

    #[test]
    fn test_invalid_category_rejected() {
        let json = r#"[{"id":"x","title":"X","category":"Cultura","description":"",
            "features":[],"benefits":[],"icon":""}]"#;
        assert!(Catalog::from_json_str(json).is_err());
    }

    #[test]
    fn test_all_with_empty_search_is_identity() {
        let catalog = Catalog::builtin().unwrap();
        let filtered: Vec<ModuleRecord> = catalog
            .filter(CategoryFilter::All, "")
            .into_iter()
            .cloned()
            .collect();
        assert_eq!(filtered, catalog.records());
    }

    #[test]
    fn test_category_and_search_are_conjunctive() {
        let catalog = sample_catalog();

        let ids = |found: Vec<&ModuleRecord>| -> Vec<String> {
            found.into_iter().map(|r| r.id.clone()).collect()
        };

        assert_eq!(
            ids(catalog.filter(CategoryFilter::Only(Category::Financeiro), "doadores")),
            vec!["doadores"]
        );
        assert!(catalog
            .filter(CategoryFilter::Only(Category::Social), "doadores")
            .is_empty());
        // "doadores" 也出現在 editais 的描述中
        assert_eq!(
            ids(catalog.filter(CategoryFilter::All, "DOADORES")),
            vec!["doadores", "editais"]
        );
        assert!(catalog.filter(CategoryFilter::All, "zzz-no-match").is_empty());
    }

    #[test]
    fn test_search_is_not_trimmed() {
        let catalog = sample_catalog();
        assert!(catalog.filter(CategoryFilter::All, " doadores ").is_empty());
    }

    #[test]
    fn test_filter_preserves_order_and_is_idempotent() {
        let catalog = Catalog::builtin().unwrap();
        let mut filters = vec![CategoryFilter::All];
        filters.extend(Category::ALL.into_iter().map(CategoryFilter::Only));
        let terms = ["", "gestão", "DE", "portal", "zzz-no-match"];

        for filter in filters {
            for term in terms {
                let once: Vec<ModuleRecord> =
                    catalog.filter(filter, term).into_iter().cloned().collect();

                for found in &once {
                    assert!(filter.matches(found.category));
                    let needle = term.to_lowercase();
                    assert!(
                        found.title.to_lowercase().contains(&needle)
                            || found.description.to_lowercase().contains(&needle)
                    );
                }

                let positions: Vec<usize> = once
                    .iter()
                    .map(|found| {
                        catalog
                            .records()
                            .iter()
                            .position(|r| r.id == found.id)
                            .unwrap()
                    })
                    .collect();
                assert!(positions.windows(2).all(|w| w[0] < w[1]));

                let twice: Vec<ModuleRecord> = filter_modules(&once, filter, term)
                    .into_iter()
                    .cloned()
                    .collect();
                assert_eq!(once, twice);
            }
        }
    }
}
