//! Sort spec compiler

use super::request::SortField;
use crate::query::SortSpec;

/// Maps sort specs 1:1 onto backend sort fields, preserving order.
pub struct SortCompiler;

impl SortCompiler {
    /// An empty slice compiles to no explicit sort.
    pub fn compile(specs: &[SortSpec]) -> Vec<SortField> {
        specs
            .iter()
            .map(|spec| SortField {
                field: spec.property.clone(),
                direction: spec.direction,
                ignore_case: spec.ignore_case,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SortDirection;

    #[test]
    fn test_order_preserved() {
        let sort = SortCompiler::compile(&[SortSpec::desc("name"), SortSpec::asc("age")]);

        assert_eq!(
            sort,
            vec![
                SortField::new("name", SortDirection::Desc),
                SortField::new("age", SortDirection::Asc),
            ]
        );
    }

    #[test]
    fn test_empty_is_no_sort() {
        assert!(SortCompiler::compile(&[]).is_empty());
    }

    #[test]
    fn test_ignore_case_carried() {
        let sort = SortCompiler::compile(&[SortSpec::asc("name").ignoring_case()]);
        assert!(sort[0].ignore_case);
    }
}
