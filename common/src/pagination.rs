//! ページング
//!
//! ページサイズは許可された選択肢のみ。範囲外の要求は拒否して直前の状態を保つ。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// 表示中のページ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageWindow {
    pub page_index: usize,
    pub page_size: usize,
    pub total_row_count: usize,
}

impl PageWindow {
    pub fn last_page_index(&self) -> usize {
        last_page_index(self.total_row_count, self.page_size)
    }
}

/// 最終ページの添字（0件なら0）
pub fn last_page_index(row_count: usize, page_size: usize) -> usize {
    if row_count == 0 || page_size == 0 {
        0
    } else {
        (row_count - 1) / page_size
    }
}

/// 指定ページの行
pub fn slice<T>(rows: &[T], page_index: usize, page_size: usize) -> &[T] {
    let start = page_index.saturating_mul(page_size).min(rows.len());
    let end = start.saturating_add(page_size).min(rows.len());
    &rows[start..end]
}

/// レイアウトずれ防止の空行数
///
/// 先頭ページでは常に0。
pub fn padding(page_index: usize, page_size: usize, row_count: usize) -> usize {
    if page_index == 0 {
        return 0;
    }
    (page_index + 1)
        .saturating_mul(page_size)
        .saturating_sub(row_count)
}

#[derive(Debug, Clone)]
pub struct PaginationController {
    allowed_sizes: Vec<usize>,
    window: PageWindow,
}

impl PaginationController {
    pub fn new(allowed_sizes: Vec<usize>, page_size: usize) -> Result<Self> {
        if page_size == 0 || !allowed_sizes.contains(&page_size) {
            return Err(Error::InvalidPageSize(page_size));
        }
        Ok(Self {
            allowed_sizes,
            window: PageWindow {
                page_index: 0,
                page_size,
                total_row_count: 0,
            },
        })
    }

    pub fn window(&self) -> PageWindow {
        self.window
    }

    pub fn allowed_sizes(&self) -> &[usize] {
        &self.allowed_sizes
    }

    pub fn change_page(&mut self, page_index: usize) -> Result<()> {
        let last_page = self.window.last_page_index();
        if page_index > last_page {
            return Err(Error::PageOutOfRange {
                page_index,
                last_page,
            });
        }
        self.window.page_index = page_index;
        Ok(())
    }

    /// ページサイズ変更（先頭ページに戻る）
    pub fn change_page_size(&mut self, page_size: usize) -> Result<()> {
        if !self.allowed_sizes.contains(&page_size) {
            return Err(Error::InvalidPageSize(page_size));
        }
        self.window.page_size = page_size;
        self.window.page_index = 0;
        Ok(())
    }

    /// 行数の更新。縮んだ場合は最終ページに寄せる
    pub fn set_total(&mut self, total_row_count: usize) {
        self.window.total_row_count = total_row_count;
        let last_page = self.window.last_page_index();
        if self.window.page_index > last_page {
            self.window.page_index = last_page;
        }
    }

    pub fn slice<'a, T>(&self, rows: &'a [T]) -> &'a [T] {
        slice(rows, self.window.page_index, self.window.page_size)
    }

    pub fn padding(&self) -> usize {
        padding(
            self.window.page_index,
            self.window.page_size,
            self.window.total_row_count,
        )
    }
}
