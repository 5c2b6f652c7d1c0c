//! Fixed and growable lists of records

use super::error::{RecordError, RecordResult};
use super::record::{ParentRef, Record};
use super::structure::RecordStructure;
use ccl_structure::config::compile_time::record::MAX_DYNAMIC_LIST_ITEMS;
use std::sync::Arc;

/// Fixed-size list; every item exists from construction
#[derive(Debug, Clone, PartialEq)]
pub struct RecordList {
    name: String,
    structure: Arc<RecordStructure>,
    records: Vec<Record>,
}

impl RecordList {
    pub(crate) fn new(
        name: &str,
        structure: Arc<RecordStructure>,
        size: usize,
        parent: &ParentRef,
    ) -> Self {
        let records = (0..size)
            .map(|_| Record::nested(name, structure.clone(), parent))
            .collect();

        Self {
            name: name.to_string(),
            structure,
            records,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shape of each item
    pub fn structure(&self) -> &Arc<RecordStructure> {
        &self.structure
    }

    pub fn get(&self, index: usize) -> RecordResult<&Record> {
        let size = self.records.len();
        self.records
            .get(index)
            .ok_or_else(|| out_of_bounds(&self.name, index, size))
    }

    pub fn get_mut(&mut self, index: usize) -> RecordResult<&mut Record> {
        let size = self.records.len();
        let name = &self.name;
        self.records
            .get_mut(index)
            .ok_or_else(|| out_of_bounds(name, index, size))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Record> {
        self.records.iter_mut()
    }
}

impl<'a> IntoIterator for &'a RecordList {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Growable list; starts empty
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicRecordList {
    name: String,
    structure: Arc<RecordStructure>,
    parent: ParentRef,
    records: Vec<Record>,
}

impl DynamicRecordList {
    pub(crate) fn new(name: &str, structure: Arc<RecordStructure>, parent: &ParentRef) -> Self {
        Self {
            name: name.to_string(),
            structure,
            parent: parent.clone(),
            records: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn structure(&self) -> &Arc<RecordStructure> {
        &self.structure
    }

    /// Append a fresh item and return it for population
    pub fn add_item(&mut self) -> RecordResult<&mut Record> {
        if self.records.len() >= MAX_DYNAMIC_LIST_ITEMS {
            return Err(RecordError::ListCapacityExceeded {
                list: self.name.clone(),
                max: MAX_DYNAMIC_LIST_ITEMS,
            });
        }

        self.records
            .push(Record::nested(&self.name, self.structure.clone(), &self.parent));
        let index = self.records.len() - 1;
        Ok(&mut self.records[index])
    }

    pub fn get(&self, index: usize) -> RecordResult<&Record> {
        let size = self.records.len();
        self.records
            .get(index)
            .ok_or_else(|| out_of_bounds(&self.name, index, size))
    }

    pub fn get_mut(&mut self, index: usize) -> RecordResult<&mut Record> {
        let size = self.records.len();
        let name = &self.name;
        self.records
            .get_mut(index)
            .ok_or_else(|| out_of_bounds(name, index, size))
    }

    pub fn remove_item(&mut self, index: usize) -> RecordResult<Record> {
        if index >= self.records.len() {
            return Err(out_of_bounds(&self.name, index, self.records.len()));
        }
        Ok(self.records.remove(index))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Record> {
        self.records.iter_mut()
    }
}

impl<'a> IntoIterator for &'a DynamicRecordList {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

fn out_of_bounds(list: &str, index: usize, size: usize) -> RecordError {
    RecordError::IndexOutOfBounds {
        list: list.to_string(),
        index,
        size,
    }
}
