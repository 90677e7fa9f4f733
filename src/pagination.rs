use serde::Serialize;

pub const DEFAULT_ITEMS_PER_PAGE: usize = 20;

/// One page of a listing together with what a client needs to page further.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: usize, page: usize, per_page: usize) -> Self {
        let per_page = per_page.max(1);
        Self {
            items,
            total,
            page: page.max(1),
            per_page,
            total_pages: total.div_ceil(per_page),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_rounds_up() {
        let page = Paginated::new(vec![1, 2], 41, 0, 20);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 3);
        assert_eq!(Paginated::<u8>::new(vec![], 0, 1, 20).total_pages, 0);
    }
}
