//! # 调用方 variant 路由

use std::collections::BTreeMap;

/// variant 对应的处理方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantRoute {
    /// 走 cohort 交接流程
    Cohort(String),
    /// 无特殊处理，透传跳转
    Passthrough,
}

/// variant 名到 cohort 名的映射
#[derive(Debug, Clone, Default)]
pub struct VariantTable {
    cohorts: BTreeMap<String, String>,
}

impl VariantTable {
    #[must_use]
    pub const fn new(cohorts: BTreeMap<String, String>) -> Self {
        Self { cohorts }
    }

    /// 未登记的 variant 视为普通 state
    #[must_use]
    pub fn resolve(&self, variant: &str) -> VariantRoute {
        self.cohorts
            .get(variant)
            .map_or(VariantRoute::Passthrough, |cohort| {
                VariantRoute::Cohort(cohort.clone())
            })
    }

    #[must_use]
    pub fn is_cohort(&self, variant: &str) -> bool {
        self.cohorts.contains_key(variant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> VariantTable {
        VariantTable::new(BTreeMap::from([
            ("knexus".to_string(), "normal".to_string()),
            ("knexus_early".to_string(), "early".to_string()),
        ]))
    }

    #[test]
    fn test_resolve() {
        let table = table();
        assert_eq!(
            table.resolve("knexus_early"),
            VariantRoute::Cohort("early".to_string())
        );
        assert_eq!(table.resolve("KNEXUS"), VariantRoute::Passthrough);
        assert_eq!(table.resolve(""), VariantRoute::Passthrough);
        assert!(table.is_cohort("knexus"));
    }
}
