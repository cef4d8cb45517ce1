//! IP Info panel - addresses of interfaces that are up

use super::{error_line, style, Payload, RefreshState, Widget};
use crate::error::WidgetError;
use crate::tui::{Command, DashEvent, WidgetId};
use nix::ifaddrs::getifaddrs;
use nix::net::if_::InterfaceFlags;
use nix::sys::socket::SockaddrStorage;
use ratatui::text::{Line, Text};
use std::net::IpAddr;
use std::time::Duration;
use tracing::warn;

pub const NO_ADDRESSES: &str = "No active addresses";

/// One address bound to an interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceAddr {
    pub name: String,
    pub addr: IpAddr,
    pub prefix: Option<u32>,
}

impl InterfaceAddr {
    /// `name: addr/prefix`
    pub fn display(&self) -> String {
        match self.prefix {
            Some(prefix) => format!("{}: {}/{}", self.name, self.addr, prefix),
            None => format!("{}: {}", self.name, self.addr),
        }
    }
}

/// Sorted display lines; a single placeholder line when nothing is up
pub fn address_lines(addrs: impl IntoIterator<Item = InterfaceAddr>) -> Vec<String> {
    let mut lines: Vec<String> = addrs.into_iter().map(|a| a.display()).collect();
    lines.sort();
    if lines.is_empty() {
        lines.push(NO_ADDRESSES.to_string());
    }
    lines
}

fn ip_of(storage: &SockaddrStorage) -> Option<IpAddr> {
    if let Some(v4) = storage.as_sockaddr_in() {
        return Some(IpAddr::V4(v4.ip()));
    }
    storage.as_sockaddr_in6().map(|v6| IpAddr::V6(v6.ip()))
}

fn prefix_len(mask: IpAddr) -> u32 {
    match mask {
        IpAddr::V4(m) => u32::from(m).count_ones(),
        IpAddr::V6(m) => u128::from(m).count_ones(),
    }
}

/// Enumerate addresses of interfaces flagged up
pub fn collect_addresses() -> Result<Vec<InterfaceAddr>, WidgetError> {
    let mut out = Vec::new();
    for ifa in getifaddrs()? {
        if !ifa.flags.contains(InterfaceFlags::IFF_UP) {
            continue;
        }
        let Some(addr) = ifa.address.as_ref().and_then(ip_of) else {
            continue;
        };
        let prefix = ifa
            .netmask
            .as_ref()
            .and_then(ip_of)
            .filter(|mask| mask.is_ipv4() == addr.is_ipv4())
            .map(prefix_len);
        out.push(InterfaceAddr {
            name: ifa.interface_name,
            addr,
            prefix,
        });
    }
    Ok(out)
}

pub struct IpWidget {
    id: WidgetId,
    every: Duration,
    state: RefreshState<Vec<String>>,
}

impl IpWidget {
    pub fn new(id: WidgetId, every: Duration) -> Self {
        Self {
            id,
            every,
            state: RefreshState::default(),
        }
    }

    fn refresh(&self) -> Command {
        Command::blocking(self.id, || {
            collect_addresses().map(|addrs| Payload::Addresses(address_lines(addrs)))
        })
    }
}

impl Widget for IpWidget {
    fn title(&self) -> &str {
        "IP Info"
    }

    fn init(&self) -> Option<Command> {
        Some(self.refresh())
    }

    fn update(&mut self, event: &DashEvent) -> Option<Command> {
        if event.tick_for(self.id).is_some() {
            return Some(self.refresh());
        }

        match event.fetched_for(self.id)? {
            Ok(Payload::Addresses(lines)) => self.state.succeed(lines.clone(), chrono::Local::now()),
            Ok(other) => self.state.fail(WidgetError::Parse(format!(
                "unexpected payload: {:?}",
                other
            ))),
            Err(e) => {
                warn!("Interface scan failed: {}", e);
                self.state.fail(e.clone());
            }
        }
        Some(Command::tick(self.id, self.every))
    }

    fn render(&self, _width: u16, _height: u16) -> Text<'static> {
        if let Some(err) = self.state.error() {
            return Text::from(error_line(err));
        }
        match self.state.value() {
            None => Text::from(Line::styled(
                "Discovering network interfaces...",
                style::muted(),
            )),
            Some(lines) => Text::from(
                lines
                    .iter()
                    .map(|l| Line::from(l.clone()))
                    .collect::<Vec<_>>(),
            ),
        }
    }
}
