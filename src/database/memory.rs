use crate::database::table::{Row, Table};
use crate::database::{StoreError, TableStore};
use crate::spreadsheet::cell::Value;

/// An in-memory [`TableStore`] keeping tables in workbook-like order.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    tables: Vec<Table>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a table, keeping the position of a replaced one.
    pub fn insert(&mut self, table: Table) {
        match self.position(&table.name) {
            Some(index) => self.tables[index] = table,
            None => self.tables.push(table),
        }
    }

    /// Borrows a table by name.
    pub fn get(&self, name: &str) -> Option<&Table> {
        self.position(name).map(|index| &self.tables[index])
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.tables.iter().position(|table| table.name == name)
    }
}

impl TableStore for MemoryStore {
    fn read_table(&self, name: &str) -> Result<Table, StoreError> {
        self.get(name)
            .cloned()
            .ok_or_else(|| StoreError::TableNotFound(name.to_owned()))
    }

    fn contains_table(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.position(name).is_some())
    }

    fn drop_table(&mut self, name: &str) -> Result<(), StoreError> {
        if let Some(index) = self.position(name) {
            self.tables.remove(index);
        }
        Ok(())
    }

    fn create_table(&mut self, name: &str, after: Option<&str>) -> Result<(), StoreError> {
        self.drop_table(name)?;
        let table = Table::new(name, Vec::new());
        match after.and_then(|after| self.position(after)) {
            Some(index) => self.tables.insert(index + 1, table),
            None => self.tables.push(table),
        }
        Ok(())
    }

    fn write_table(&mut self, name: &str, header: &[Value], rows: &[&Row]) -> Result<(), StoreError> {
        let index = self
            .position(name)
            .ok_or_else(|| StoreError::NotCreated(name.to_owned()))?;
        let mut content = Vec::with_capacity(rows.len() + 1);
        content.push(header.to_vec());
        content.extend(rows.iter().map(|row| row.to_vec()));
        self.tables[index] = Table::new(name, content);
        Ok(())
    }

    fn table_names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.tables.iter().map(|table| table.name.to_owned()).collect())
    }

    fn replace_table(&mut self, name: &str, header: &[Value], rows: &[&Row]) -> Result<(), StoreError> {
        let mut content = Vec::with_capacity(rows.len() + 1);
        content.push(header.to_vec());
        content.extend(rows.iter().map(|row| row.to_vec()));
        self.insert(Table::new(name, content));
        Ok(())
    }
}
