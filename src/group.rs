//! Partition records into one group per output graph.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use crate::error::Result;
use crate::filter::require_fields;
use crate::record::{Fields, ParsedRecord};

/// Residual fields identifying one graph: every field of a record except the
/// group-by fields.
///
/// Pairs keep the record's field order for titles and file names, but
/// equality and hashing treat them as a set.
#[derive(Debug, Clone)]
pub struct GroupKey {
    fields: Fields,
}

impl GroupKey {
    /// Build the key of `record` by dropping `group_by` fields.
    /// Every group-by field must be present.
    pub fn for_record(record: &ParsedRecord, group_by: &[String]) -> Result<Self> {
        let mut fields = record.fields().clone();
        for field in group_by {
            record.require(field)?;
            fields.remove(field);
        }
        Ok(GroupKey { fields })
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    fn sorted(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<_> = self.fields.iter().collect();
        pairs.sort_unstable();
        pairs
    }
}

impl From<Fields> for GroupKey {
    fn from(fields: Fields) -> Self {
        GroupKey { fields }
    }
}

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        self.fields.len() == other.fields.len() && self.sorted() == other.sorted()
    }
}

impl Eq for GroupKey {}

impl Hash for GroupKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sorted().hash(state);
    }
}

/// Records that share a [`GroupKey`] and end up on the same graph.
#[derive(Debug, Clone)]
pub struct Group {
    pub key: GroupKey,
    pub records: Vec<ParsedRecord>,
}

/// Group `records` by their residual fields.
///
/// Groups come out in the order their first record was seen; records keep
/// their input order within a group. Fails before grouping anything if any
/// record lacks a group-by field.
pub fn group_records(records: Vec<ParsedRecord>, group_by: &[String]) -> Result<Vec<Group>> {
    require_fields(&records, group_by.iter().map(String::as_str))?;

    let mut groups: Vec<Group> = Vec::new();
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    for record in records {
        let key = GroupKey::for_record(&record, group_by)?;
        match index.get(&key) {
            Some(&i) => groups[i].records.push(record),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(Group {
                    key,
                    records: vec![record],
                });
            }
        }
    }
    Ok(groups)
}
