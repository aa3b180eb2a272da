//! Root detection for POSIX and Windows path syntaxes.
//!
//! Windows recognises, in priority order: `\\?\` verbatim prefixes (with an
//! optional `X:\` drive or `UNC\server\share` suffix), `\\.\device`
//! prefixes, `\\server\share` UNC roots, `X:\` drive roots and a single
//! leading separator.

use super::PathStyle;

pub(super) fn root_length(style: PathStyle, bytes: &[u8]) -> usize {
    match style {
        PathStyle::Posix => usize::from(bytes.first() == Some(&b'/')),
        PathStyle::Windows => windows_root_length(bytes),
    }
}

const fn is_win_sep(byte: u8) -> bool {
    matches!(byte, b'/' | b'\\')
}

fn windows_root_length(bytes: &[u8]) -> usize {
    match bytes {
        [b'\\', b'\\', b'?', b'\\', rest @ ..] => 4 + verbatim_suffix_length(rest),
        [b'\\', b'\\', b'.', b'\\', rest @ ..] => 4 + component_length(rest),
        [first, second, rest @ ..] if is_win_sep(*first) && is_win_sep(*second) => {
            // A UNC root needs at least a one-letter server and a separator.
            if bytes.len() < 4 {
                return 0;
            }
            server_share_length(rest).map_or(0, |len| 2 + len)
        }
        [_, b':', sep, ..] if is_win_sep(*sep) => 3,
        [sep] if is_win_sep(*sep) => 1,
        [sep, next, ..] if is_win_sep(*sep) && !is_win_sep(*next) => 1,
        _ => 0,
    }
}

/// Extra root bytes following a `\\?\` prefix.
fn verbatim_suffix_length(rest: &[u8]) -> usize {
    match rest {
        [_, b':', sep, ..] if is_win_sep(*sep) => 3,
        [b'U', b'N', b'C', b'\\', unc @ ..] => server_share_length(unc).map_or(0, |len| 4 + len),
        _ => 0,
    }
}

/// Length of a leading `server\share` pair.
///
/// Returns `None` unless a non-empty server name is followed by a separator.
/// The share name may be empty and runs up to the next separator.
fn server_share_length(bytes: &[u8]) -> Option<usize> {
    let server = component_length(bytes);
    if server == 0 || server >= bytes.len() {
        return None;
    }
    let share = bytes.get(server + 1..).map_or(0, component_length);
    Some(server + 1 + share)
}

fn component_length(bytes: &[u8]) -> usize {
    bytes
        .iter()
        .position(|byte| is_win_sep(*byte))
        .unwrap_or(bytes.len())
}
