/// 分页状态 - 当前页码从 1 开始，每页条数固定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    current: usize,
    page_size: usize,
}

impl PageState {
    /// page_size 为 0 属于配置错误，应在配置校验阶段拦截
    pub fn new(page_size: usize) -> Self {
        debug_assert!(page_size > 0, "每页条数必须大于 0");
        Self {
            current: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// 总页数，至少为 1
    pub fn total_pages(&self, total: usize) -> usize {
        total_pages(total, self.page_size)
    }

    /// 筛选结果变化后调用：当前页超出范围时收缩到最后一页
    pub fn clamp(&mut self, total: usize) {
        let last = self.total_pages(total);
        if self.current > last {
            log::debug!("页码 {} 超出范围，调整为 {}", self.current, last);
            self.current = last;
        }
    }

    /// 下一页；已在最后一页时不变
    pub fn next(&mut self, total: usize) -> bool {
        if self.current < self.total_pages(total) {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// 上一页；已在第一页时不变
    pub fn previous(&mut self) -> bool {
        if self.current > 1 {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    /// 当前页在结果中的下标区间 [start, end)
    pub fn range(&self, total: usize) -> std::ops::Range<usize> {
        let start = ((self.current - 1) * self.page_size).min(total);
        let end = (start + self.page_size).min(total);
        start..end
    }

    /// 截取当前页
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.range(items.len())]
    }
}

/// max(1, ceil(total / page_size))
pub fn total_pages(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1)).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_is_at_least_one() {
        assert_eq!(total_pages(0, 16), 1);
        assert_eq!(total_pages(16, 16), 1);
        assert_eq!(total_pages(17, 16), 2);
        assert_eq!(total_pages(33, 16), 3);
    }

    #[test]
    fn seventeen_items_spill_onto_second_page() {
        let items: Vec<u32> = (0..17).collect();
        let mut page = PageState::new(16);
        assert!(page.next(items.len()));
        assert_eq!(page.current(), 2);
        assert_eq!(page.slice(&items), &[16]);
    }

    #[test]
    fn shrinking_results_clamp_to_last_page() {
        let mut page = PageState::new(16);
        page.next(17);
        page.clamp(10);
        assert_eq!(page.current(), 1);

        let mut page = PageState::new(5);
        page.next(30);
        page.next(30);
        page.next(30);
        assert_eq!(page.current(), 4);
        page.clamp(12);
        assert_eq!(page.current(), 3);
        // 仍在范围内时保持不变
        page.clamp(30);
        assert_eq!(page.current(), 3);
    }

    #[test]
    fn navigation_is_idempotent_at_bounds() {
        let mut page = PageState::new(16);
        assert!(!page.previous());
        assert!(!page.next(16));
        assert_eq!(page.current(), 1);

        page.next(20);
        assert!(!page.next(20));
        assert_eq!(page.current(), 2);
    }

    #[test]
    fn pages_concatenate_to_whole() {
        let items: Vec<u32> = (0..37).collect();
        let mut page = PageState::new(8);
        let mut collected = Vec::new();
        loop {
            let slice = page.slice(&items);
            assert!(slice.len() <= page.page_size());
            collected.extend_from_slice(slice);
            if !page.next(items.len()) {
                break;
            }
        }
        assert_eq!(collected, items);
    }

    #[test]
    fn empty_results_have_one_empty_page() {
        let page = PageState::new(16);
        let items: Vec<u32> = Vec::new();
        assert!(page.slice(&items).is_empty());
        assert_eq!(page.total_pages(0), 1);
    }
}
