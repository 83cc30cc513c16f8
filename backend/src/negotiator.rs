use std::io;

/// Upper bound on the bind fallback scan.
pub const MAX_BIND_ATTEMPTS: u16 = 10;

#[derive(Debug, thiserror::Error)]
pub enum BindError {
    #[error("Ports {0} through {1} are all in use")]
    Exhausted(u16, u16),
    #[error("Failed to bind port {port}: {source}")]
    Fatal { port: u16, source: io::Error },
}

/// Bind on the preferred port, falling forward to the next higher port while
/// the address is in use. Any other bind failure is fatal. The returned port
/// is fixed for the process lifetime.
pub fn negotiate<T, F>(
    preferred_port: u16,
    max_attempts: u16,
    mut try_bind: F,
) -> Result<(T, u16), BindError>
where
    F: FnMut(u16) -> io::Result<T>,
{
    for offset in 0..max_attempts {
        let Some(port) = preferred_port.checked_add(offset) else {
            break;
        };
        match try_bind(port) {
            Ok(bound) => return Ok((bound, port)),
            Err(err) if err.kind() == io::ErrorKind::AddrInUse => {
                log::warn!(
                    "Port {} is busy, trying port {}...",
                    port,
                    port.saturating_add(1)
                );
            }
            Err(err) => return Err(BindError::Fatal { port, source: err }),
        }
    }

    Err(BindError::Exhausted(
        preferred_port,
        preferred_port.saturating_add(max_attempts.saturating_sub(1)),
    ))
}
