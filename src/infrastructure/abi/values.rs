//! Extraction of typed values from decoded ABI outputs

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, U256};

use crate::domain::AccountRow;
use crate::error::{BridgeError, BridgeResult};

/// Take the single return value of `function`.
pub fn single<'a>(function: &str, values: &'a [DynSolValue]) -> BridgeResult<&'a DynSolValue> {
    match values {
        [value] => Ok(value),
        _ => Err(BridgeError::decode(
            function,
            format!("expected 1 return value, got {}", values.len()),
        )),
    }
}

pub fn as_uint(function: &str, value: &DynSolValue) -> BridgeResult<U256> {
    match value {
        DynSolValue::Uint(v, _) => Ok(*v),
        other => Err(mismatch(function, "uint", other)),
    }
}

pub fn as_address(function: &str, value: &DynSolValue) -> BridgeResult<Address> {
    match value {
        DynSolValue::Address(addr) => Ok(*addr),
        other => Err(mismatch(function, "address", other)),
    }
}

pub fn as_string(function: &str, value: &DynSolValue) -> BridgeResult<String> {
    match value {
        DynSolValue::String(s) => Ok(s.clone()),
        other => Err(mismatch(function, "string", other)),
    }
}

/// Decode the `getAccounts()` return value into rows, in contract order.
///
/// Row layout: `(id, owner, subject, description, token, targetAmount,
/// monthlyRemittance, created)`.
pub fn account_rows(function: &str, values: &[DynSolValue]) -> BridgeResult<Vec<AccountRow>> {
    let rows = match single(function, values)? {
        DynSolValue::Array(rows) | DynSolValue::FixedArray(rows) => rows,
        other => return Err(mismatch(function, "tuple[]", other)),
    };

    rows.iter().map(|row| account_row(function, row)).collect()
}

fn account_row(function: &str, value: &DynSolValue) -> BridgeResult<AccountRow> {
    let fields = match value {
        DynSolValue::Tuple(fields) => fields,
        other => return Err(mismatch(function, "tuple", other)),
    };
    if fields.len() < 8 {
        return Err(BridgeError::decode(
            function,
            format!("account tuple has {} fields, expected 8", fields.len()),
        ));
    }

    let created = as_uint(function, &fields[7])?;
    let created = u64::try_from(created)
        .map_err(|_| BridgeError::decode(function, format!("timestamp {} overflows u64", created)))?;

    Ok(AccountRow {
        id: as_uint(function, &fields[0])?,
        owner: as_address(function, &fields[1])?,
        subject: as_string(function, &fields[2])?,
        description: as_string(function, &fields[3])?,
        token: as_address(function, &fields[4])?,
        target_amount: as_uint(function, &fields[5])?,
        monthly_remittance: as_uint(function, &fields[6])?,
        created,
    })
}

fn mismatch(function: &str, expected: &str, got: &DynSolValue) -> BridgeError {
    let kind = match got {
        DynSolValue::Bool(_) => "bool",
        DynSolValue::Int(..) => "int",
        DynSolValue::Uint(..) => "uint",
        DynSolValue::Address(_) => "address",
        DynSolValue::String(_) => "string",
        DynSolValue::Bytes(_) | DynSolValue::FixedBytes(..) => "bytes",
        DynSolValue::Array(_) | DynSolValue::FixedArray(_) => "array",
        DynSolValue::Tuple(_) => "tuple",
        _ => "unsupported value",
    };
    BridgeError::decode(function, format!("expected {}, got {}", expected, kind))
}
