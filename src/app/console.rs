use crate::app::command::{Command, EntryMode, LineRef};
use crate::core::normalizer::normalize;
use crate::core::session::{IngestOutcome, TransferSession};
use crate::domain::model::{Code, ConfirmationMode, EntrySource, LifecycleState, Transfer};
use crate::domain::ports::{Clock, Storage, SubmissionSink};
use crate::utils::error::{Result, TransferError};
use chrono::Local;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// 以文字行操作的介面，將指令轉給 `TransferSession` 並印出結果
pub struct Console<S: SubmissionSink, C: Clock, St: Storage, W: Write> {
    session: TransferSession<S, C>,
    storage: St,
    out: W,
    entry_mode: EntryMode,
    auto_export: bool,
}

impl<S: SubmissionSink, C: Clock, St: Storage, W: Write> Console<S, C, St, W> {
    pub fn new(session: TransferSession<S, C>, storage: St, out: W) -> Self {
        Self {
            session,
            storage,
            out,
            entry_mode: EntryMode::Off,
            auto_export: false,
        }
    }

    pub fn with_auto_export(mut self, enabled: bool) -> Self {
        self.auto_export = enabled;
        self
    }

    pub fn session(&self) -> &TransferSession<S, C> {
        &self.session
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> Result<()> {
        self.print_banner()?;
        let mut lines = input.lines();

        loop {
            self.print_prompt()?;
            let Some(line) = lines.next_line().await? else {
                break;
            };
            if self.handle_line(&line).await? == Flow::Quit {
                break;
            }
        }

        tracing::info!("Session ended");
        Ok(())
    }

    /// 處理一行輸入；指令錯誤只會印出，不會中斷迴圈
    pub async fn handle_line(&mut self, line: &str) -> Result<Flow> {
        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(e) => {
                self.report(&e)?;
                return Ok(Flow::Continue);
            }
        };

        if command == Command::Quit {
            return Ok(Flow::Quit);
        }

        if let Err(e) = self.execute(command).await {
            if e.is_recoverable() {
                self.report(&e)?;
            } else {
                return Err(e);
            }
        }
        Ok(Flow::Continue)
    }

    async fn execute(&mut self, command: Command) -> Result<()> {
        match command {
            Command::From(location) => {
                self.session.set_from_location(&location)?;
                writeln!(self.out, "📍 From: {}", self.session.from_location())?;
            }
            Command::To(location) => {
                self.session.set_to_location(&location)?;
                writeln!(self.out, "📍 To: {}", self.session.to_location())?;
            }
            Command::Scan(raw) => self.ingest(&raw, EntrySource::Scanner)?,
            Command::Add(raw) => self.ingest(&raw, EntrySource::Manual)?,
            Command::Entry(raw) => match self.entry_mode {
                EntryMode::Scanner => self.ingest(&raw, EntrySource::Scanner)?,
                EntryMode::Manual => self.ingest(&raw, EntrySource::Manual)?,
                EntryMode::Off => {
                    writeln!(
                        self.out,
                        "👆 Choose a method first: 'mode scan' or 'mode manual' (or type 'help')"
                    )?;
                }
            },
            Command::Mode(mode) => self.switch_mode(mode)?,
            Command::Qty(target, quantity) => {
                let code = self.resolve(&target)?;
                let item = self.session.set_quantity(&code, quantity)?;
                writeln!(self.out, "✅ {} qty set to {}", item.code, item.quantity)?;
            }
            Command::Inc(target) => {
                let code = self.resolve(&target)?;
                let item = self.session.increment(&code)?;
                writeln!(self.out, "➕ {} (qty: {})", item.code, item.quantity)?;
            }
            Command::Dec(target) => {
                let code = self.resolve(&target)?;
                let item = self.session.decrement(&code)?;
                writeln!(self.out, "➖ {} (qty: {})", item.code, item.quantity)?;
            }
            Command::Remove(target) => {
                let code = self.resolve(&target)?;
                let removed = self.session.remove(&code)?;
                writeln!(self.out, "🗑️ Removed: {}", removed.code)?;
            }
            Command::List => self.print_parts()?,
            Command::Review => {
                self.session.review()?;
                self.print_review()?;
            }
            Command::Cancel => {
                self.session.cancel()?;
                writeln!(self.out, "↩️ Review cancelled - keep editing")?;
            }
            Command::Confirm => {
                self.session.confirm().await?;
                self.after_submit().await?;
            }
            Command::Submit => {
                self.session.submit().await?;
                self.after_submit().await?;
            }
            Command::New => {
                self.session.start_new()?;
                self.entry_mode = EntryMode::Off;
                writeln!(self.out, "🔄 New transfer started")?;
            }
            Command::Export => {
                let file_name = self.session.export_document(&self.storage).await?;
                writeln!(self.out, "📄 Transfer document saved: {}", file_name)?;
            }
            Command::Clear => {
                self.session.clear_all()?;
                writeln!(self.out, "🔄 All parts cleared")?;
            }
            Command::Help => self.print_help()?,
            Command::Empty | Command::Quit => {}
        }
        Ok(())
    }

    fn ingest(&mut self, raw: &str, source: EntrySource) -> Result<()> {
        let outcome = match self.session.ingest(raw, source) {
            Ok(outcome) => outcome,
            Err(TransferError::InvalidInput { .. }) => {
                let message = match source {
                    EntrySource::Scanner => "Invalid QR code",
                    EntrySource::Manual => "Invalid part number",
                };
                writeln!(self.out, "❌ {}", message)?;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        match (outcome, source) {
            (IngestOutcome::Suppressed, _) => {}
            (IngestOutcome::Added { item, .. }, EntrySource::Scanner) => {
                writeln!(
                    self.out,
                    "🎯 Item: {} scanned (Total qty: {})",
                    item.code, item.quantity
                )?;
            }
            (IngestOutcome::Added { item, created: true }, EntrySource::Manual) => {
                writeln!(self.out, "✅ Added: {}", item.code)?;
            }
            (IngestOutcome::Added { item, created: false }, EntrySource::Manual) => {
                writeln!(self.out, "✅ Updated: {} (qty: {})", item.code, item.quantity)?;
            }
        }
        Ok(())
    }

    fn switch_mode(&mut self, mode: EntryMode) -> Result<()> {
        if self.entry_mode == EntryMode::Scanner && mode != EntryMode::Scanner {
            self.session.reset_scanner();
        }
        self.entry_mode = mode;

        match mode {
            EntryMode::Scanner => writeln!(
                self.out,
                "📱 QR Scanner Active - repeated scans within {:.1}s are ignored",
                self.session.cooldown_window().as_secs_f64()
            )?,
            EntryMode::Manual => writeln!(self.out, "⌨️ Manual Entry Mode - enter part numbers")?,
            EntryMode::Off => writeln!(self.out, "❌ Entry closed")?,
        }
        Ok(())
    }

    fn resolve(&self, target: &LineRef) -> Result<Code> {
        match target {
            LineRef::Line(line) => {
                self.session
                    .ledger()
                    .code_at(*line)
                    .cloned()
                    .ok_or_else(|| TransferError::NotFound {
                        code: format!("#{}", line),
                    })
            }
            LineRef::Code(raw) => normalize(raw),
        }
    }

    async fn after_submit(&mut self) -> Result<()> {
        let Some(transfer) = self.session.receipt().cloned() else {
            return Ok(());
        };
        self.print_receipt(&transfer)?;

        if self.auto_export {
            let file_name = self.session.export_document(&self.storage).await?;
            writeln!(self.out, "📄 Transfer document saved: {}", file_name)?;
        }
        Ok(())
    }

    fn report(&mut self, error: &TransferError) -> Result<()> {
        tracing::debug!("Command failed: {}", error);
        match error {
            TransferError::NotReady { missing } => {
                writeln!(self.out, "⚠️ Required: {}", missing.join(", "))?;
            }
            TransferError::InvalidInput { reason, .. } if reason.starts_with("usage:") => {
                writeln!(self.out, "❓ {}", reason)?;
            }
            TransferError::SubmissionFailed { .. } => {
                writeln!(self.out, "❌ {}", error.user_friendly_message())?;
                writeln!(self.out, "💡 {}", error.recovery_suggestion())?;
            }
            _ => writeln!(self.out, "❌ {}", error.user_friendly_message())?,
        }
        Ok(())
    }

    fn print_banner(&mut self) -> Result<()> {
        writeln!(self.out, "📦 Parts Transfer")?;
        match self.session.mode() {
            ConfirmationMode::TwoStep => {
                writeln!(self.out, "Review before sending: 'review' then 'confirm'")?
            }
            ConfirmationMode::OneStep => {
                writeln!(self.out, "One-step mode: 'submit' sends the current list")?
            }
        }
        writeln!(self.out, "Type 'help' for commands.")?;
        Ok(())
    }

    fn print_prompt(&mut self) -> Result<()> {
        let label = match (self.session.state(), self.entry_mode) {
            (LifecycleState::Reviewing, _) => "review",
            (LifecycleState::Submitted, _) => "receipt",
            (_, EntryMode::Scanner) => "scan",
            (_, EntryMode::Manual) => "manual",
            (_, EntryMode::Off) => "draft",
        };
        write!(self.out, "[{}]> ", label)?;
        self.out.flush()?;
        Ok(())
    }

    fn print_parts(&mut self) -> Result<()> {
        let ledger = self.session.ledger();
        if ledger.is_empty() {
            writeln!(self.out, "No parts added yet - choose a mode to start")?;
            return Ok(());
        }

        writeln!(
            self.out,
            "📊 {} total items • {} different parts",
            ledger.total_items(),
            ledger.type_count()
        )?;
        for (i, item) in ledger.iter().enumerate() {
            writeln!(self.out, "{:2}. {}  x{}", i + 1, item.code, item.quantity)?;
        }
        Ok(())
    }

    fn print_review(&mut self) -> Result<()> {
        let Some(pending) = self.session.pending() else {
            return Ok(());
        };

        writeln!(self.out, "⚠️ PLEASE REVIEW TRANSFER DETAILS BEFORE PROCEEDING")?;
        writeln!(self.out, "FROM LOCATION: {}", pending.from_location)?;
        writeln!(self.out, "TO LOCATION: {}", pending.to_location)?;
        writeln!(
            self.out,
            "📊 {} total items • {} different parts",
            pending.total_items(),
            pending.type_count()
        )?;
        for (i, item) in pending.items.iter().enumerate() {
            writeln!(
                self.out,
                "{:2}. {} - Quantity: {}",
                i + 1,
                item.code,
                item.quantity
            )?;
        }
        writeln!(self.out, "Type 'confirm' to submit or 'cancel' to keep editing")?;
        Ok(())
    }

    fn print_receipt(&mut self, transfer: &Transfer) -> Result<()> {
        writeln!(self.out, "✅ TRANSFER COMPLETED SUCCESSFULLY!")?;
        writeln!(self.out, "Transfer ID: {}", transfer.id)?;
        writeln!(
            self.out,
            "Date/Time: {}",
            transfer
                .created_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(self.out, "From: {}", transfer.from_location)?;
        writeln!(self.out, "To: {}", transfer.to_location)?;
        writeln!(
            self.out,
            "📊 {} total items transferred • {} different parts",
            transfer.total_items(),
            transfer.type_count()
        )?;
        for item in &transfer.items {
            writeln!(self.out, "[ ] {}  Qty: {}", item.code, item.quantity)?;
        }
        writeln!(
            self.out,
            "Type 'export' to save the transfer document or 'new' to start over"
        )?;
        Ok(())
    }

    fn print_help(&mut self) -> Result<()> {
        writeln!(self.out, "from <location>        set the source location")?;
        writeln!(self.out, "to <location>          set the destination location")?;
        writeln!(self.out, "mode scan|manual|off   choose how bare input is treated")?;
        writeln!(self.out, "scan <code>            record a scanner read")?;
        writeln!(self.out, "add <code>             record a typed part number")?;
        writeln!(self.out, "qty <#n|code> <n>      set a quantity")?;
        writeln!(self.out, "inc|dec <#n|code>      adjust a quantity by one")?;
        writeln!(self.out, "rm <#n|code>           remove a line")?;
        writeln!(self.out, "list                   show the parts list")?;
        writeln!(self.out, "review / cancel        open or close the review screen")?;
        writeln!(self.out, "confirm                submit the reviewed transfer")?;
        writeln!(self.out, "submit                 submit (one-step mode)")?;
        writeln!(self.out, "export                 save the transfer document")?;
        writeln!(self.out, "new                    start a new transfer after a receipt")?;
        writeln!(self.out, "clear                  clear all parts")?;
        writeln!(self.out, "quit                   exit")?;
        Ok(())
    }
}
