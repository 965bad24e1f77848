use crate::interfaces::facade::WalletRequest;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum CommandAction {
    Create,
    #[serde(alias = "read")]
    Get,
    #[serde(alias = "add")]
    Credit,
    #[serde(alias = "subtract")]
    Debit,
}

/// One row of a command file: `action, wallet, player, amount`.
///
/// Fields stay raw strings so that the façade, not the reader, decides what
/// is well-formed. For `create`, `amount` is the initial balance.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct CommandRecord {
    pub action: CommandAction,
    #[serde(default)]
    pub wallet: Option<String>,
    #[serde(default)]
    pub player: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
}

impl From<CommandRecord> for WalletRequest {
    fn from(record: CommandRecord) -> Self {
        let id = record.wallet.unwrap_or_default();
        match record.action {
            CommandAction::Create => WalletRequest::Create {
                player_id: record.player,
                balance: record.amount,
            },
            CommandAction::Get => WalletRequest::Get { id },
            CommandAction::Credit => WalletRequest::Credit {
                id,
                amount: record.amount,
            },
            CommandAction::Debit => WalletRequest::Debit {
                id,
                amount: record.amount,
            },
        }
    }
}

/// Reads wallet commands from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over parsed
/// commands. It handles whitespace trimming and flexible record lengths.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    /// Creates a new `CommandReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes commands.
    pub fn commands(self) -> impl Iterator<Item = Result<CommandRecord, csv::Error>> {
        self.reader.into_deserialize()
    }
}
