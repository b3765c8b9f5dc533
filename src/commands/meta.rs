use std::io::Write;
use std::path::Path;
use std::process::Command as Process;

use comfy_table::Table;

use super::session::Session;
use super::Flow;
use crate::config::ColumnOverride;
use crate::database::IsolationLevel;
use crate::error::{ShellError, ShellResult};
use crate::logging::LogLevel;
use crate::render::OutputMode;

pub fn use_database(session: &mut Session, arg: &str, _out: &mut dyn Write) -> ShellResult<Flow> {
    if arg.is_empty() {
        return Err(ShellError::InvalidParameter(
            "missing database file name".to_string(),
        ));
    }
    session.open(Path::new(arg))?;
    Ok(Flow::Continue)
}

pub fn mode(session: &mut Session, arg: &str, out: &mut dyn Write) -> ShellResult<Flow> {
    if arg.is_empty() {
        writeln!(out, "Actual mode is {}.", session.mode)?;
        return Ok(Flow::Continue);
    }

    let mode = OutputMode::from_name(arg);
    if !mode.is_declared() {
        tracing::warn!("Mode \"{}\" is unknown, results will not be shown.", mode);
    }
    session.mode = mode;
    Ok(Flow::Continue)
}

pub fn cfg_table_column(session: &mut Session, arg: &str, out: &mut dyn Write) -> ShellResult<Flow> {
    let params: Vec<&str> = arg.split_whitespace().collect();

    match params.as_slice() {
        [] => show_table_config(session, out)?,
        [del, rest @ ..] if del.eq_ignore_ascii_case("DEL") => {
            let column = rest.first().ok_or_else(|| {
                ShellError::InvalidParameter("DEL needs a column".to_string())
            })?;
            session.formats.table.columns.remove(column)?;
        }
        [column, rest @ ..] => session.formats.table.columns.set(column, rest)?,
    }
    Ok(Flow::Continue)
}

fn show_table_config(session: &Session, out: &mut dyn Write) -> ShellResult<()> {
    let table_format = &session.formats.table;
    writeln!(out, "Configuration for Outputformat TABLE:")?;
    writeln!(out, "Maximum Table Width: {}", table_format.max_width)?;

    if table_format.columns.is_empty() {
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Column", "max_width", "min_width", "truncate line"]);
    for (column, settings) in table_format.columns.iter() {
        let ColumnOverride {
            max_width,
            min_width,
            truncate,
        } = settings;
        table.add_row(vec![
            column.clone(),
            or_unset(max_width),
            or_unset(min_width),
            or_unset(truncate),
        ]);
    }
    writeln!(out, "Column Configurations:")?;
    writeln!(out, "{}", table)?;
    Ok(())
}

fn or_unset<T: ToString>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "unset".to_string())
}

pub fn sys_update_table_names(
    session: &mut Session,
    _arg: &str,
    _out: &mut dyn Write,
) -> ShellResult<Flow> {
    session.refresh_schema()?;
    Ok(Flow::Continue)
}

pub fn show_column_names(session: &mut Session, arg: &str, out: &mut dyn Write) -> ShellResult<Flow> {
    if arg.is_empty() {
        return Err(ShellError::InvalidParameter("missing table name".to_string()));
    }

    let columns = session.lookup_columns(arg);
    if columns.is_empty() {
        tracing::info!("No cached columns for table '{}'.", arg);
    }
    for column in columns {
        writeln!(out, "{}", column)?;
    }
    Ok(Flow::Continue)
}

pub fn loglevel(session: &mut Session, arg: &str, out: &mut dyn Write) -> ShellResult<Flow> {
    if arg.is_empty() {
        writeln!(out, "Actual loglevel is {}", session.log_level)?;
    } else {
        let level = LogLevel::parse(arg)?;
        session.set_log_level(level)?;
    }
    Ok(Flow::Continue)
}

pub fn isolation_level(session: &mut Session, arg: &str, out: &mut dyn Write) -> ShellResult<Flow> {
    session.database()?;

    if arg.is_empty() {
        writeln!(out, "Actual isolation_level is {}", session.isolation_level)?;
    } else {
        session.isolation_level = IsolationLevel::parse(arg)?;
    }
    Ok(Flow::Continue)
}

pub fn commit(session: &mut Session, _arg: &str, _out: &mut dyn Write) -> ShellResult<Flow> {
    session.database()?.commit()?;
    Ok(Flow::Continue)
}

pub fn rollback(session: &mut Session, _arg: &str, _out: &mut dyn Write) -> ShellResult<Flow> {
    session.database()?.rollback()?;
    Ok(Flow::Continue)
}

pub fn shell(_session: &mut Session, arg: &str, out: &mut dyn Write) -> ShellResult<Flow> {
    if arg.is_empty() {
        return Ok(Flow::Continue);
    }

    tracing::debug!("running shell command: {}", arg);
    let output = Process::new("sh").arg("-c").arg(arg).output()?;
    out.write_all(&output.stdout)?;
    if !output.status.success() {
        tracing::warn!(
            status = %output.status,
            "{}",
            String::from_utf8_lossy(&output.stderr).trim_end()
        );
    }
    Ok(Flow::Continue)
}

pub fn quit(session: &mut Session, _arg: &str, _out: &mut dyn Write) -> ShellResult<Flow> {
    session.disconnect();
    tracing::info!("== Exit shell ==");
    Ok(Flow::Quit)
}
