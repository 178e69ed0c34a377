//! Parsing typed parameter literals from the command line.

use eyre::{bail, eyre, WrapErr};
use storekit_core::Value;

/// Parses one `-p` literal.
///
/// Accepted forms: `null`, `i:<integer>`, `r:<real>`, `t:<text>` and
/// `x:<hex>`. Text keeps everything after the first colon verbatim.
pub fn parse_param(literal: &str) -> eyre::Result<Value> {
    if literal == "null" {
        return Ok(Value::Null);
    }
    let (kind, body) = literal
        .split_once(':')
        .ok_or_else(|| eyre!("parameter `{literal}` has no type prefix (i:, r:, t:, x: or null)"))?;
    let value = match kind {
        "i" => Value::Integer(
            body.parse()
                .wrap_err_with(|| format!("invalid integer parameter `{body}`"))?,
        ),
        "r" => Value::Real(
            body.parse()
                .wrap_err_with(|| format!("invalid real parameter `{body}`"))?,
        ),
        "t" => Value::Text(body.to_string()),
        "x" => Value::Blob(
            hex::decode(body).wrap_err_with(|| format!("invalid hex parameter `{body}`"))?,
        ),
        other => bail!("unknown parameter type `{other}`"),
    };
    Ok(value)
}

/// Parses every literal, stopping at the first invalid one.
pub fn parse_params(literals: &[String]) -> eyre::Result<Vec<Value>> {
    literals.iter().map(|l| parse_param(l)).collect()
}
