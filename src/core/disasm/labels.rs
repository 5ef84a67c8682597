// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Label storage for the analysis and output passes
//!
//! A [`LabelTable`] is an append-only list of (name, address) pairs that is
//! sorted once the producing pass finishes. Duplicate addresses are allowed
//! and survive sorting in a stable order; callers that want uniqueness check
//! with [`LabelTable::find`] before adding.

/// A named code or data address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    /// Symbol name as it appears in the output
    pub name: String,
    /// Virtual address the name refers to
    pub vaddr: u32,
}

/// Growable collection of labels
#[derive(Debug, Clone)]
pub struct LabelTable {
    labels: Vec<Label>,
}

impl LabelTable {
    /// Create an empty table
    pub fn new() -> Self {
        LabelTable {
            labels: Vec::with_capacity(128),
        }
    }

    /// Append a label
    ///
    /// # Arguments
    ///
    /// * `name` - Symbol name, or `None` to generate `L<vaddr>` from the
    ///   address
    /// * `vaddr` - Virtual address the label refers to
    pub fn add(&mut self, name: Option<&str>, vaddr: u32) {
        let name = match name {
            Some(n) => n.to_owned(),
            None => format!("L{:08X}", vaddr),
        };
        self.labels.push(Label { name, vaddr });
    }

    /// First label at `vaddr`, in insertion order before sorting and in name
    /// order after
    pub fn find(&self, vaddr: u32) -> Option<&Label> {
        self.labels.iter().find(|l| l.vaddr == vaddr)
    }

    /// Sort by address, breaking ties by name
    ///
    /// Output passes require this ordering; it is stable, so equal (address,
    /// name) pairs keep their insertion order.
    pub fn sort(&mut self) {
        self.labels
            .sort_by(|a, b| a.vaddr.cmp(&b.vaddr).then_with(|| a.name.cmp(&b.name)));
    }

    /// Number of labels
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the table holds no labels
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label at `index`, if in range
    pub fn get(&self, index: usize) -> Option<&Label> {
        self.labels.get(index)
    }

    /// Iterate over labels in current order
    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }
}

impl Default for LabelTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ========== Add and Find Tests ==========

    #[test]
    fn test_add_with_explicit_name() {
        let mut table = LabelTable::new();
        table.add(Some("func_80001234"), 0x80001234);

        let label = table.find(0x80001234).unwrap();
        assert_eq!(label.name, "func_80001234");
        assert_eq!(label.vaddr, 0x80001234);
    }

    #[test]
    fn test_add_generates_default_name() {
        let mut table = LabelTable::new();
        table.add(None, 0x8033B400);

        assert_eq!(table.find(0x8033B400).unwrap().name, "L8033B400");
    }

    #[test]
    fn test_find_miss_returns_none() {
        let mut table = LabelTable::new();
        table.add(Some("func_80001234"), 0x80001234);

        assert!(table.find(0x80005678).is_none());
    }

    #[test]
    fn test_find_returns_first_match() {
        let mut table = LabelTable::new();
        table.add(Some("first"), 0x80001000);
        table.add(Some("second"), 0x80001000);

        assert_eq!(table.find(0x80001000).unwrap().name, "first");
    }

    #[test]
    fn test_len_and_is_empty() {
        let mut table = LabelTable::new();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);

        table.add(None, 0x80000000);
        assert!(!table.is_empty());
        assert_eq!(table.len(), 1);
    }

    // ========== Sort Tests ==========

    #[test]
    fn test_sort_orders_by_address() {
        let mut table = LabelTable::new();
        table.add(Some("func_80002000"), 0x80002000);
        table.add(Some("func_80001000"), 0x80001000);
        table.add(Some("func_80003000"), 0x80003000);
        table.sort();

        let addrs: Vec<u32> = table.iter().map(|l| l.vaddr).collect();
        assert_eq!(addrs, vec![0x80001000, 0x80002000, 0x80003000]);
    }

    #[test]
    fn test_sort_breaks_address_ties_by_name() {
        let mut table = LabelTable::new();
        table.add(Some("osWritebackDCache"), 0x80001000);
        table.add(Some("func_80001000"), 0x80001000);
        table.sort();

        assert_eq!(table.get(0).unwrap().name, "func_80001000");
        assert_eq!(table.get(1).unwrap().name, "osWritebackDCache");
    }

    #[test]
    fn test_sort_empty_table() {
        let mut table = LabelTable::new();
        table.sort();
        assert!(table.is_empty());
    }

    proptest! {
        #[test]
        fn test_sort_produces_nondecreasing_order(
            pairs in prop::collection::vec((any::<u32>(), "[A-Za-z_][A-Za-z0-9_]{0,11}"), 0..64)
        ) {
            let mut table = LabelTable::new();
            for (vaddr, name) in &pairs {
                table.add(Some(name), *vaddr);
            }
            table.sort();

            for i in 1..table.len() {
                let prev = table.get(i - 1).unwrap();
                let cur = table.get(i).unwrap();
                prop_assert!(
                    (prev.vaddr, prev.name.as_str()) <= (cur.vaddr, cur.name.as_str())
                );
            }
            prop_assert_eq!(table.len(), pairs.len());
        }
    }
}
