use std::collections::HashMap;

use crate::platform::{Channel, User};

/// Per-run snapshot of the public channel tree.
///
/// Channels live in an arena; parent links are resolved through the id index
/// on demand, so a parent id that points outside the snapshot is simply a
/// dead end rather than an error.
pub struct ChannelDirectory {
    channels: Vec<Channel>,
    index: HashMap<String, usize>,
}

impl ChannelDirectory {
    pub fn new(channels: Vec<Channel>) -> Self {
        let mut arena: Vec<Channel> = Vec::with_capacity(channels.len());
        let mut index = HashMap::with_capacity(channels.len());
        for ch in channels {
            // Later duplicates replace earlier ones, like a map insert.
            match index.get(&ch.id) {
                Some(&i) => arena[i] = ch,
                None => {
                    index.insert(ch.id.clone(), arena.len());
                    arena.push(ch);
                }
            }
        }
        Self {
            channels: arena,
            index,
        }
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn get(&self, id: &str) -> Option<&Channel> {
        self.index.get(id).map(|&i| &self.channels[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Channel> {
        self.channels.iter()
    }

    fn parent_index(&self, idx: usize) -> Option<usize> {
        let pid = self.channels[idx].parent_id.as_deref()?;
        self.index.get(pid).copied()
    }

    /// Full `#root/.../name` path of `channel`.
    ///
    /// The walk stops at a channel without a parent, at a parent id missing
    /// from the directory, or at the first channel already visited.
    pub fn resolve_path(&self, channel: &Channel) -> String {
        let mut segments = vec![channel.name.as_str()];
        let mut visited = vec![false; self.channels.len()];

        let mut next = match self.index.get(&channel.id) {
            Some(&start) => {
                visited[start] = true;
                self.parent_index(start)
            }
            // Channel outside the snapshot: the walk starts at its parent.
            None => channel
                .parent_id
                .as_deref()
                .and_then(|pid| self.index.get(pid).copied()),
        };
        while let Some(idx) = next {
            if visited[idx] {
                break;
            }
            visited[idx] = true;
            segments.push(self.channels[idx].name.as_str());
            next = self.parent_index(idx);
        }

        segments.reverse();
        format!("#{}", segments.join("/"))
    }
}

/// Per-run lookup of users by id, used for mention lists.
pub struct UserDirectory {
    users: HashMap<String, User>,
}

impl UserDirectory {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: users.into_iter().map(|u| (u.id.clone(), u)).collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&User> {
        self.users.get(id)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }
}
