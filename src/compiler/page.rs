//! Offset page planner

use tracing::debug;

use super::filter::FilterCompiler;
use super::request::SearchRequest;
use super::sort::SortCompiler;
use crate::errors::RepoResult;
use crate::query::PageQuery;

/// Builds offset search requests. Deep pages cost the backend more; that
/// trade-off is accepted here.
pub struct PageQueryPlanner<'a> {
    filter_compiler: &'a FilterCompiler,
}

impl<'a> PageQueryPlanner<'a> {
    pub fn new(filter_compiler: &'a FilterCompiler) -> Self {
        Self { filter_compiler }
    }

    /// Plans a page query. Pure: same query, same request.
    pub fn plan(&self, query: &PageQuery) -> RepoResult<SearchRequest> {
        query.validate()?;

        let request = SearchRequest::offset(
            self.filter_compiler.compile(&query.filters),
            query.offset(),
            query.page_size,
            SortCompiler::compile(&query.sort),
        );

        debug!(
            page_no = query.page_no,
            page_size = query.page_size,
            clauses = request.query.len(),
            "planned page query"
        );

        Ok(request)
    }
}
