//! Settings response types: a `Setting` interface whose variants share a
//! `value` union so clients can select values polymorphically.

use async_graphql::{Interface, SimpleObject, Union};

#[derive(Debug, Clone, SimpleObject)]
pub struct BooleanSettingValue {
    pub set: bool,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct StringListSettingValue {
    pub values: Vec<String>,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct SelectableItemValue {
    pub id: String,
    pub label: String,
    #[graphql(name = "freeText")]
    pub free_text: Option<String>,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct SelectableSettingValue {
    pub items: Vec<SelectableItemValue>,
    #[graphql(name = "allowsMultipleSelection")]
    pub allows_multiple_selection: bool,
}

#[derive(Debug, Clone, Union)]
pub enum SettingValue {
    Boolean(BooleanSettingValue),
    StringList(StringListSettingValue),
    Selectable(SelectableSettingValue),
}

#[derive(Debug, Clone, SimpleObject)]
pub struct BooleanSetting {
    pub key: String,
    pub subkey: Option<String>,
    pub title: String,
    pub description: String,
    pub value: SettingValue,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct StringListSetting {
    pub key: String,
    pub subkey: Option<String>,
    pub title: String,
    pub description: String,
    pub value: SettingValue,
}

/// Single- and multi-select settings; the available items live here, the
/// chosen ones in the value.
#[derive(Debug, Clone, SimpleObject)]
pub struct SelectSetting {
    pub key: String,
    pub subkey: Option<String>,
    pub title: String,
    pub description: String,
    pub value: SettingValue,
    pub options: Vec<SelectableItemValue>,
    #[graphql(name = "allowsMultipleSelection")]
    pub allows_multiple_selection: bool,
}

#[derive(Debug, Clone, Interface)]
#[graphql(
    field(name = "key", ty = "&String"),
    field(name = "subkey", ty = "&Option<String>"),
    field(name = "title", ty = "&String"),
    field(name = "description", ty = "&String"),
    field(name = "value", ty = "&SettingValue")
)]
pub enum Setting {
    BooleanSetting(BooleanSetting),
    StringListSetting(StringListSetting),
    SelectSetting(SelectSetting),
}
