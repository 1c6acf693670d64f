use anyhow::{bail, Result};
use clap::Subcommand;

use super::action_error;
use crate::models::settings::UpdateSettingsRequest;
use crate::services::store::Store;

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// 查看推送设置
    Show,
    /// 修改推送设置
    Update {
        /// Server酱 SendKey
        #[arg(long)]
        serverchan_key: Option<String>,
        /// 每日推送时间，如 15:30
        #[arg(long)]
        push_time: Option<String>,
    },
    /// 发送测试推送
    TestNotify,
}

pub async fn run(store: &Store, cmd: SettingsCommand) -> Result<()> {
    match cmd {
        SettingsCommand::Show => {
            if !store.fetch_settings().await {
                return Err(action_error(store, "加载设置"));
            }
            print_settings(store);
        }
        SettingsCommand::Update { serverchan_key, push_time } => {
            let request = UpdateSettingsRequest { serverchan_key, push_time };
            if request.is_empty() {
                bail!("没有需要修改的设置");
            }
            if !store.update_settings(&request).await {
                return Err(action_error(store, "更新设置"));
            }
            println!("设置已更新");
            print_settings(store);
        }
        SettingsCommand::TestNotify => {
            let result = store
                .test_notify()
                .await
                .ok_or_else(|| action_error(store, "测试推送"))?;
            if !result.success {
                bail!("{}", result.message);
            }
            println!("{}", result.message);
        }
    }
    Ok(())
}

fn print_settings(store: &Store) {
    match store.snapshot().settings {
        Some(settings) => {
            let key = if settings.serverchan_configured {
                settings.serverchan_key.unwrap_or_else(|| "****".to_string())
            } else {
                "未配置".to_string()
            };
            println!("Server酱: {}", key);
            println!("推送时间: {}", settings.push_time.as_deref().unwrap_or("-"));
        }
        None => println!("（未加载设置）"),
    }
}
