/// In-memory group list mirroring the persisted record
use crate::error::CacheError;
use crate::tab_data::{Group, TabRecord};

/// Every mutation happens here synchronously, before any write is scheduled.
/// Out-of-range addresses come back as `CacheError` and leave the list untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupCache {
    groups: Vec<Group>,
}

impl GroupCache {
    pub fn new() -> Self {
        GroupCache { groups: Vec::new() }
    }

    #[cfg(test)]
    pub fn from_groups(groups: Vec<Group>) -> Self {
        GroupCache { groups }
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn snapshot(&self) -> Vec<Group> {
        self.groups.clone()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn total_tabs(&self) -> usize {
        self.groups.iter().map(|g| g.tabs.len()).sum()
    }

    pub fn get(&self, index: usize) -> Result<&Group, CacheError> {
        self.groups.get(index).ok_or(CacheError::StaleGroup(index))
    }

    pub fn tab(&self, group: usize, tab: usize) -> Result<&TabRecord, CacheError> {
        self.get(group)?
            .tabs
            .get(tab)
            .ok_or(CacheError::StaleTab { group, tab })
    }

    pub fn position_of(&self, group_id: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.id == group_id)
    }

    pub fn replace(&mut self, groups: Vec<Group>) {
        self.groups = groups;
    }

    pub fn clear(&mut self) {
        self.groups.clear();
    }

    #[cfg(test)]
    /// Newest first
    pub fn prepend(&mut self, group: Group) {
        self.groups.insert(0, group);
    }

    /// Inserts `groups` at the front, keeping their relative order
    pub fn prepend_all(&mut self, groups: Vec<Group>) {
        self.groups.splice(0..0, groups);
    }

    /// Removes one tab. A group left empty stays until the next sync prunes it.
    pub fn remove_tab(&mut self, group: usize, tab: usize) -> Result<TabRecord, CacheError> {
        let tabs = &mut self
            .groups
            .get_mut(group)
            .ok_or(CacheError::StaleGroup(group))?
            .tabs;
        if tab >= tabs.len() {
            return Err(CacheError::StaleTab { group, tab });
        }
        Ok(tabs.remove(tab))
    }

    /// Removes the group; later groups shift down by one
    pub fn remove_group(&mut self, index: usize) -> Result<Group, CacheError> {
        if index >= self.groups.len() {
            return Err(CacheError::StaleGroup(index));
        }
        Ok(self.groups.remove(index))
    }

    /// Returns `Ok(false)` when the trimmed name is blank or unchanged
    pub fn rename(&mut self, index: usize, new_name: &str) -> Result<bool, CacheError> {
        let group = self
            .groups
            .get_mut(index)
            .ok_or(CacheError::StaleGroup(index))?;
        let name = new_name.trim();
        if name.is_empty() || name == group.custom_name {
            return Ok(false);
        }
        group.custom_name = name.to_string();
        Ok(true)
    }

    /// Appends the source's tabs to the target, then removes the source.
    /// `Ok(false)` when both indices name the same group.
    pub fn merge(&mut self, source: usize, target: usize) -> Result<bool, CacheError> {
        self.get(source)?;
        self.get(target)?;
        if source == target {
            return Ok(false);
        }
        let moved = self.groups.remove(source);
        let target = if source < target { target - 1 } else { target };
        self.groups[target].tabs.extend(moved.tabs);
        Ok(true)
    }

    /// Moves a tab to the end of another group, field values untouched.
    /// `Ok(false)` when source and target are the same group.
    pub fn move_tab(
        &mut self,
        source_group: usize,
        source_tab: usize,
        target_group: usize,
    ) -> Result<bool, CacheError> {
        self.tab(source_group, source_tab)?;
        self.get(target_group)?;
        if source_group == target_group {
            return Ok(false);
        }
        let tab = self.groups[source_group].tabs.remove(source_tab);
        self.groups[target_group].tabs.push(tab);
        Ok(true)
    }
}
