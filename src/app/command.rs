use crate::utils::error::{Result, TransferError};

/// 目前的輸入模式，決定未加指令的文字如何處理
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryMode {
    Scanner,
    Manual,
    Off,
}

/// 指向清單中的一行：`#2` 為行號，其餘視為零件代碼
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineRef {
    Line(usize),
    Code(String),
}

impl LineRef {
    fn parse(raw: &str) -> Result<Self> {
        match raw.strip_prefix('#') {
            Some(number) => number
                .parse::<usize>()
                .map(LineRef::Line)
                .map_err(|_| usage_error(raw, "line numbers look like #2")),
            None => Ok(LineRef::Code(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    From(String),
    To(String),
    Scan(String),
    Add(String),
    /// 未加指令的輸入，依目前模式處理
    Entry(String),
    Mode(EntryMode),
    Qty(LineRef, i64),
    Inc(LineRef),
    Dec(LineRef),
    Remove(LineRef),
    List,
    Review,
    Cancel,
    Confirm,
    Submit,
    New,
    Export,
    Clear,
    Help,
    Quit,
    Empty,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Command::Empty);
        }

        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "from" => Command::From(required(rest, "from <location>")?),
            "to" => Command::To(required(rest, "to <location>")?),
            "scan" => Command::Scan(required(rest, "scan <code>")?),
            "add" => Command::Add(required(rest, "add <code>")?),
            "mode" => Command::Mode(match rest.to_ascii_lowercase().as_str() {
                "scan" | "scanner" | "qr" => EntryMode::Scanner,
                "manual" => EntryMode::Manual,
                "off" | "close" => EntryMode::Off,
                _ => return Err(usage_error(rest, "mode scan|manual|off")),
            }),
            "qty" => {
                let (target, quantity) = rest
                    .rsplit_once(char::is_whitespace)
                    .ok_or_else(|| usage_error(rest, "qty <#line|code> <quantity>"))?;
                let quantity = quantity
                    .parse::<i64>()
                    .map_err(|_| usage_error(quantity, "quantity must be a whole number"))?;
                Command::Qty(LineRef::parse(target.trim())?, quantity)
            }
            "inc" | "+" => Command::Inc(LineRef::parse(&required(rest, "inc <#line|code>")?)?),
            "dec" | "-" => Command::Dec(LineRef::parse(&required(rest, "dec <#line|code>")?)?),
            "rm" | "remove" | "del" => {
                Command::Remove(LineRef::parse(&required(rest, "rm <#line|code>")?)?)
            }
            "list" | "ls" => Command::List,
            "review" => Command::Review,
            "cancel" => Command::Cancel,
            "confirm" => Command::Confirm,
            "submit" => Command::Submit,
            "new" => Command::New,
            "export" => Command::Export,
            "clear" => Command::Clear,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            // 掃描槍通常直接送出代碼，不帶指令
            _ => Command::Entry(line.to_string()),
        };

        Ok(command)
    }
}

fn required(rest: &str, usage: &str) -> Result<String> {
    if rest.is_empty() {
        Err(usage_error(rest, usage))
    } else {
        Ok(rest.to_string())
    }
}

fn usage_error(raw: &str, usage: &str) -> TransferError {
    TransferError::InvalidInput {
        raw: raw.to_string(),
        reason: format!("usage: {}", usage),
    }
}
