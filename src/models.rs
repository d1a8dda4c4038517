use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Todo,
    Doing,
    Done,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub label: String,
    pub color: String, // display color identifier, not validated
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub body: String,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<Tag>,
}

// The whole store as persisted: the ID counter plus every task in
// insertion order. In-memory state and the on-disk file share this shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    #[serde(default)]
    pub next_id: u64,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Default for Snapshot {
    // First-run state: nothing stored yet, IDs start at 1.
    fn default() -> Self {
        Snapshot {
            next_id: 1,
            tasks: Vec::new(),
        }
    }
}

// Payload for POST /tasks. `title` defaults to empty so a missing field
// hits the store's "title required" validation instead of a decode error.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTask {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub tag: Option<Tag>,
}

// A patch field is either absent from the body (leave the stored value
// alone) or present (set it, even to an empty value). Plain `Option`
// cannot tell those apart, so each field carries this tag explicitly.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Field<T> {
    #[default]
    Absent,
    Set(T),
}

impl<'de, T> Deserialize<'de> for Field<T>
where
    T: Deserialize<'de>,
{
    // Only runs when the key is present in the body; an absent key falls
    // through to `Default`.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Field::Set)
    }
}

// Payload for PUT/PATCH /tasks/:id. Unknown keys are rejected to catch
// typos in the body. `tag` is doubly optional: `"tag": null` clears it,
// an absent key keeps it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaskPatch {
    pub title: Field<String>,
    pub body: Field<String>,
    pub status: Field<TaskStatus>,
    pub tag: Field<Option<Tag>>,
}
