// This file is part of quash, a job-control shell.
// Copyright (C) 2026 WATANABE Yuki
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Mapping from process IDs to jobs

use super::Pid;

/// Number of buckets in a [`JobTable`]
///
/// This must be a power of two.
pub const TABLE_BUCKETS: usize = 64;

const _: () = assert!(TABLE_BUCKETS.is_power_of_two());

/// Hash table from process IDs to job indices
///
/// The table has a fixed number of buckets. A process ID is hashed to the
/// bucket at `pid & (TABLE_BUCKETS - 1)`, and each bucket is a list of the
/// entries that share it.
#[derive(Clone, Debug)]
pub struct JobTable {
    buckets: Vec<Vec<(Pid, usize)>>,
    elements: usize,
}

impl Default for JobTable {
    fn default() -> Self {
        JobTable {
            buckets: vec![Vec::new(); TABLE_BUCKETS],
            elements: 0,
        }
    }
}

fn bucket_of(pid: Pid) -> usize {
    pid.as_raw() as usize & (TABLE_BUCKETS - 1)
}

impl JobTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements
    }

    /// Tests whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements == 0
    }

    /// Associates a process ID with a job index.
    ///
    /// Returns the index previously associated with the process ID, if any.
    pub fn insert(&mut self, pid: Pid, job_index: usize) -> Option<usize> {
        let bucket = &mut self.buckets[bucket_of(pid)];
        match bucket.iter_mut().find(|(key, _)| *key == pid) {
            Some((_, index)) => Some(std::mem::replace(index, job_index)),
            None => {
                bucket.push((pid, job_index));
                self.elements += 1;
                None
            }
        }
    }

    /// Returns the job index associated with the process ID.
    #[must_use]
    pub fn get(&self, pid: Pid) -> Option<usize> {
        self.buckets[bucket_of(pid)]
            .iter()
            .find(|(key, _)| *key == pid)
            .map(|&(_, index)| index)
    }

    /// Removes the process ID from the table.
    ///
    /// Returns the job index that was associated with it.
    pub fn remove(&mut self, pid: Pid) -> Option<usize> {
        let bucket = &mut self.buckets[bucket_of(pid)];
        let position = bucket.iter().position(|(key, _)| *key == pid)?;
        let (_, index) = bucket.swap_remove(position);
        self.elements -= 1;
        Some(index)
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.buckets.iter_mut().for_each(Vec::clear);
        self.elements = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_lookup_delete_many() {
        let mut table = JobTable::new();
        for raw in 1..=256 {
            assert_eq!(table.insert(Pid::from_raw(raw), raw as usize % 7), None);
        }
        assert_eq!(table.len(), 256);

        for raw in 1..=256 {
            assert_eq!(table.get(Pid::from_raw(raw)), Some(raw as usize % 7));
        }
        for raw in 1..=256 {
            assert_eq!(table.remove(Pid::from_raw(raw)), Some(raw as usize % 7));
        }

        assert_eq!(table.len(), 0);
        assert!(table.is_empty());
        for raw in 1..=256 {
            assert_eq!(table.get(Pid::from_raw(raw)), None, "{raw}");
            assert_eq!(table.remove(Pid::from_raw(raw)), None, "{raw}");
        }
    }

    #[test]
    fn colliding_pids_share_a_bucket() {
        let mut table = JobTable::new();
        let a = Pid::from_raw(5);
        let b = Pid::from_raw(5 + TABLE_BUCKETS as i32);
        table.insert(a, 0);
        table.insert(b, 1);
        assert_eq!(bucket_of(a), bucket_of(b));
        assert_eq!(table.remove(a), Some(0));
        assert_eq!(table.get(b), Some(1));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn insert_replaces_existing_entry() {
        let mut table = JobTable::new();
        let pid = Pid::from_raw(42);
        assert_eq!(table.insert(pid, 3), None);
        assert_eq!(table.insert(pid, 4), Some(3));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(pid), Some(4));
        table.clear();
        assert_eq!(table.get(pid), None);
        assert!(table.is_empty());
    }
}
