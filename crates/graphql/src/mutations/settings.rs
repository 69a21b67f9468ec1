//! modifySetting.

use async_graphql::{Context, Enum, ID, InputObject, Object, Result, SimpleObject};

use meridian_upstream::settings;

use crate::{error, queries::parts, transform, types::Setting};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum ModifySettingErrorCode {
    InvalidInput,
}

#[derive(InputObject)]
pub struct SelectedItemInput {
    pub id: String,
    #[graphql(name = "freeText")]
    pub free_text: Option<String>,
}

/// Exactly one member must be set, matching the setting's configured type.
#[derive(InputObject)]
pub struct SettingValueInput {
    pub boolean: Option<bool>,
    #[graphql(name = "stringList")]
    pub string_list: Option<Vec<String>>,
    #[graphql(name = "selectedItems")]
    pub selected_items: Option<Vec<SelectedItemInput>>,
}

#[derive(InputObject)]
pub struct ModifySettingInput {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    /// Node the setting is scoped to (an entity or organization id).
    #[graphql(name = "nodeID")]
    pub node_id: ID,
    pub key: String,
    pub subkey: Option<String>,
    pub value: SettingValueInput,
}

#[derive(SimpleObject)]
pub struct ModifySettingPayload {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    pub success: bool,
    #[graphql(name = "errorCode")]
    pub error_code: Option<ModifySettingErrorCode>,
    #[graphql(name = "errorMessage")]
    pub error_message: Option<String>,
    pub setting: Option<Setting>,
}

/// Build the wire value for the configured type, or a user-facing reason
/// why the input does not fit.
fn assemble_value(
    config: &settings::SettingConfig,
    input: &SettingValueInput,
) -> std::result::Result<settings::SettingValue, &'static str> {
    match config.setting_type {
        settings::SettingType::Boolean => {
            let set = input.boolean.ok_or("a boolean value is required")?;
            Ok(settings::SettingValue::Boolean { set })
        }
        settings::SettingType::StringList => {
            let values = input
                .string_list
                .as_ref()
                .ok_or("a list of values is required")?;
            let values: Vec<String> = values
                .iter()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect();
            Ok(settings::SettingValue::StringList { values })
        }
        settings::SettingType::SingleSelect => {
            let items = input
                .selected_items
                .as_ref()
                .ok_or("a selection is required")?;
            let [item] = items.as_slice() else {
                return Err("exactly one selection is required");
            };
            if !config.allowed_items.iter().any(|a| a.id == item.id) {
                return Err("that option is not available");
            }
            if item.free_text.is_some() && !config.allows_free_text {
                return Err("free text is not accepted here");
            }
            Ok(settings::SettingValue::SingleSelect {
                item_id: item.id.clone(),
                free_text: item.free_text.clone(),
            })
        }
        settings::SettingType::MultiSelect => {
            let items = input
                .selected_items
                .as_ref()
                .ok_or("a selection is required")?;
            for item in items {
                if !config.allowed_items.iter().any(|a| a.id == item.id) {
                    return Err("that option is not available");
                }
                if item.free_text.is_some() && !config.allows_free_text {
                    return Err("free text is not accepted here");
                }
            }
            Ok(settings::SettingValue::MultiSelect {
                item_ids: items.iter().map(|i| i.id.clone()).collect(),
                free_texts: items
                    .iter()
                    .map(|i| i.free_text.clone().unwrap_or_default())
                    .collect(),
            })
        }
    }
}

#[derive(Default)]
pub struct SettingsMutations;

#[Object]
impl SettingsMutations {
    /// Write a setting value. Idempotent: writing the stored value again
    /// succeeds and leaves it unchanged.
    #[graphql(name = "modifySetting")]
    async fn modify_setting(
        &self,
        ctx: &Context<'_>,
        input: ModifySettingInput,
    ) -> Result<ModifySettingPayload> {
        let (rc, ram, _config) = parts(ctx)?;
        rc.require_account()?;

        let fail = |client_mutation_id, message: &str| {
            Ok(ModifySettingPayload {
                client_mutation_id,
                success: false,
                error_code: Some(ModifySettingErrorCode::InvalidInput),
                error_message: Some(message.to_string()),
                setting: None,
            })
        };

        let configs = ram
            .setting_configs(&[input.key.clone()])
            .await
            .map_err(|e| rc.upstream(e))?;
        let Some(setting_config) = configs.into_iter().find(|c| c.key == input.key) else {
            return Err(error::not_found(&input.key));
        };

        let value = match assemble_value(&setting_config, &input.value) {
            Ok(value) => value,
            Err(reason) => return fail(input.client_mutation_id, reason),
        };

        let setting = settings::Setting {
            key: input.key.clone(),
            subkey: input.subkey.clone(),
            value,
        };
        match ram
            .set_setting_value(settings::SetValueRequest {
                node_id: input.node_id.to_string(),
                setting: setting.clone(),
            })
            .await
        {
            Ok(()) => {}
            Err(e) if e.is_invalid_argument() => {
                return fail(input.client_mutation_id, &e.to_string());
            }
            Err(e) => return Err(rc.upstream(e)),
        }
        Ok(ModifySettingPayload {
            client_mutation_id: input.client_mutation_id,
            success: true,
            error_code: None,
            error_message: None,
            setting: Some(transform::setting(&setting_config, Some(&setting))),
        })
    }
}
