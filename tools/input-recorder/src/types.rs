use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Idle,
    Recording,
    Playing,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Playing => "playing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerId {
    Record,
    Playback,
}

impl TriggerId {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Record => "record",
            Self::Playback => "playback",
        }
    }
}

/// Classification of a value change, mirroring the host toolkit's
/// `inputType` names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum InputKind {
    InsertText,
    InsertFromPaste,
    DeleteContentBackward,
    DeleteContentForward,
    HistoryUndo,
    HistoryRedo,
    /// Synthetic notifications carry no classification.
    Unspecified,
}

impl InputKind {
    pub fn is_history(self) -> bool {
        matches!(self, Self::HistoryUndo | Self::HistoryRedo)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InsertText => "insertText",
            Self::InsertFromPaste => "insertFromPaste",
            Self::DeleteContentBackward => "deleteContentBackward",
            Self::DeleteContentForward => "deleteContentForward",
            Self::HistoryUndo => "historyUndo",
            Self::HistoryRedo => "historyRedo",
            Self::Unspecified => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOrigin {
    User,
    Programmatic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEvent {
    pub value: String,
    pub kind: InputKind,
    pub origin: EventOrigin,
    pub bubbles: bool,
}

impl InputEvent {
    pub fn user(value: impl Into<String>, kind: InputKind) -> Self {
        Self {
            value: value.into(),
            kind,
            origin: EventOrigin::User,
            bubbles: true,
        }
    }

    /// Notification raised by playback after it assigns a value.
    pub fn synthetic(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: InputKind::Unspecified,
            origin: EventOrigin::Programmatic,
            bubbles: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    ChildList,
    Attributes,
    CharacterData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedNode {
    /// `None` for nodes without textual content.
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub kind: MutationKind,
    pub added_nodes: Vec<AddedNode>,
}

impl MutationRecord {
    pub fn child_list_added(text: impl Into<String>) -> Self {
        Self {
            kind: MutationKind::ChildList,
            added_nodes: vec![AddedNode {
                text: Some(text.into()),
            }],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObserveOptions {
    pub child_list: bool,
    pub attributes: bool,
    pub character_data: bool,
}

impl ObserveOptions {
    pub fn child_list() -> Self {
        Self {
            child_list: true,
            ..Self::default()
        }
    }

    pub fn accepts(&self, kind: MutationKind) -> bool {
        match kind {
            MutationKind::ChildList => self.child_list,
            MutationKind::Attributes => self.attributes,
            MutationKind::CharacterData => self.character_data,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureSource {
    Input,
    Mutation,
}

impl CaptureSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Mutation => "mutation",
        }
    }
}
