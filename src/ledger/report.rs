//! Grouped memory report.

use std::fmt;

/// Instances and bytes attributed to one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeGroup {
    /// Type name
    pub type_name: String,
    /// Number of instances
    pub count: usize,
    /// Total bytes across instances
    pub bytes: usize,
}

impl TypeGroup {
    pub(crate) fn new(type_name: &str, count: usize, bytes: usize) -> Self {
        Self {
            type_name: type_name.to_string(),
            count,
            bytes,
        }
    }
}

/// Number of constructions seen for one (type, arguments) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CtorCount {
    /// Type name
    pub type_name: String,
    /// Construction argument description
    pub args: String,
    /// Constructions seen
    pub count: usize,
}

/// Snapshot of the ledger grouped by type.
///
/// Groups are ordered by descending total bytes, ties by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryReport {
    /// Live object count
    pub live_count: usize,
    /// Live bytes
    pub live_bytes: usize,
    /// Peak live bytes
    pub peak_bytes: usize,
    /// Live objects by type
    pub live: Vec<TypeGroup>,
    /// Every construction ever recorded, by type (only with `include_all`)
    pub history: Option<Vec<TypeGroup>>,
    /// Construction counts by arguments (only with `include_all`)
    pub ctor_args: Option<Vec<CtorCount>>,
}

impl MemoryReport {
    /// Group for `type_name` among live objects
    pub fn live_group(&self, type_name: &str) -> Option<&TypeGroup> {
        self.live.iter().find(|g| g.type_name == type_name)
    }

    /// Report rendered one line per entry
    pub fn lines(&self) -> Vec<String> {
        self.to_string().lines().map(str::to_string).collect()
    }
}

pub(crate) fn sorted_groups(groups: impl Iterator<Item = TypeGroup>) -> Vec<TypeGroup> {
    let mut groups: Vec<TypeGroup> = groups.collect();
    groups.sort_by(|a, b| {
        b.bytes
            .cmp(&a.bytes)
            .then_with(|| a.type_name.cmp(&b.type_name))
    });
    groups
}

fn write_groups(f: &mut fmt::Formatter<'_>, groups: &[TypeGroup]) -> fmt::Result {
    for group in groups {
        writeln!(
            f,
            "  {:>10} bytes {:>8} x  {}",
            group.bytes, group.count, group.type_name
        )?;
    }
    Ok(())
}

impl fmt::Display for MemoryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Live objects: {} ({} bytes, peak {} bytes)",
            self.live_count, self.live_bytes, self.peak_bytes
        )?;
        write_groups(f, &self.live)?;

        if let Some(history) = &self.history {
            writeln!(f, "Total constructed:")?;
            write_groups(f, history)?;
        }
        if let Some(ctor_args) = &self.ctor_args {
            writeln!(f, "Constructor argument counts:")?;
            for entry in ctor_args {
                writeln!(f, "  {:>8} x  {}({})", entry.count, entry.type_name, entry.args)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_by_bytes_then_name() {
        let groups = sorted_groups(
            vec![
                TypeGroup::new("b", 1, 5),
                TypeGroup::new("a", 1, 5),
                TypeGroup::new("c", 9, 50),
            ]
            .into_iter(),
        );
        let names: Vec<&str> = groups.iter().map(|g| g.type_name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_display_sections() {
        let report = MemoryReport {
            live_count: 1,
            live_bytes: 8,
            peak_bytes: 16,
            live: vec![TypeGroup::new("Amount", 1, 8)],
            history: Some(vec![TypeGroup::new("Amount", 2, 16)]),
            ctor_args: Some(vec![CtorCount {
                type_name: "Amount".into(),
                args: "copy".into(),
                count: 2,
            }]),
        };
        let lines = report.lines();
        assert_eq!(lines[0], "Live objects: 1 (8 bytes, peak 16 bytes)");
        assert!(lines[1].ends_with("8 bytes        1 x  Amount"), "{}", lines[1]);
        assert_eq!(lines[2], "Total constructed:");
        assert_eq!(lines[4], "Constructor argument counts:");
        assert!(lines[5].ends_with("2 x  Amount(copy)"), "{}", lines[5]);
    }
}
