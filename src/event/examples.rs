// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Examples tables driving repeated scenario runs.

use linked_hash_map::LinkedHashMap;

/// Single row of an [`ExamplesTable`], keyed by column header.
pub type Row = LinkedHashMap<String, String>;

/// Table of examples a scenario is run with.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ExamplesTable {
    /// Column headers.
    pub headers: Vec<String>,

    /// Rows of values.
    pub rows: Vec<Row>,
}

impl ExamplesTable {
    /// Creates an [`ExamplesTable`] out of the given `headers` and positional
    /// `rows`.
    ///
    /// Missing trailing cells are filled with empty strings, extra cells are
    /// ignored.
    #[must_use]
    pub fn new<H, R, C>(headers: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        let rows = rows
            .into_iter()
            .map(|cells| {
                let mut cells = cells.into_iter().map(Into::into);
                headers
                    .iter()
                    .map(|h| (h.clone(), cells.next().unwrap_or_default()))
                    .collect()
            })
            .collect();
        Self { headers, rows }
    }

    /// Indicates whether this [`ExamplesTable`] has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_follow_headers() {
        let table = ExamplesTable::new(
            ["user", "role"],
            [vec!["alice", "admin"], vec!["bob"]],
        );

        assert_eq!(table.headers, ["user", "role"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].get("role").map(String::as_str), Some("admin"));
        assert_eq!(table.rows[1].get("role").map(String::as_str), Some(""));
        assert_eq!(
            table.rows[1].keys().map(String::as_str).collect::<Vec<_>>(),
            ["user", "role"],
        );
    }
}
