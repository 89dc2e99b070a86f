use crate::{
    apps::PackageRegistry,
    error::{Error, Result},
    service::{PlatformService, ServiceManager},
};
use std::{fmt::Display, io::BufRead, str::FromStr};
use tracing::{debug, warn};

/// Something that happened in the guest which may change the application list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageEvent {
    /// This process just started
    Started,
    Added(String),
    Changed(String),
    /// A package went away; `replacing` is set when it is only being upgraded
    Removed { package: String, replacing: bool },
}

impl FromStr for PackageEvent {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let words = s.split_whitespace().collect::<Vec<_>>();
        Ok(match words.as_slice() {
            ["start" | "started"] => Self::Started,
            ["added", package] => Self::Added(package.to_string()),
            ["changed", package] => Self::Changed(package.to_string()),
            ["removed", package] => Self::Removed {
                package: package.to_string(),
                replacing: false,
            },
            ["removed", package, "replacing"] => Self::Removed {
                package: package.to_string(),
                replacing: true,
            },
            _ => return Err(Error::BadEvent(s.to_owned())),
        })
    }
}

impl Display for PackageEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Started => f.write_str("started"),
            Self::Added(package) => write!(f, "added {package}"),
            Self::Changed(package) => write!(f, "changed {package}"),
            Self::Removed {
                package,
                replacing: false,
            } => write!(f, "removed {package}"),
            Self::Removed {
                package,
                replacing: true,
            } => write!(f, "removed {package} replacing"),
        }
    }
}

/// Turns guest events into application list updates for the host
///
/// Every event is handled to completion before the next one, and nothing is coalesced:
/// each added or changed package triggers a full re-enumeration.
pub struct EventSource<R, M> {
    service: PlatformService<R, M>,
}

impl<R: PackageRegistry, M: ServiceManager> EventSource<R, M> {
    pub fn new(service: PlatformService<R, M>) -> Self {
        Self { service }
    }

    /// React to a single event
    pub fn handle(&mut self, event: &PackageEvent) {
        debug!(%event, "handling package event");

        match event {
            PackageEvent::Started
            | PackageEvent::Added(_)
            | PackageEvent::Changed(_) => {
                self.service.send_application_list_update()
            }
            PackageEvent::Removed {
                package,
                replacing: false,
            } => self.service.notify_package_removed(package),
            // The matching "added" event of the upgrade triggers a full sync
            PackageEvent::Removed {
                replacing: true, ..
            } => {}
        }
    }

    /// Handle the start of the process, then one event per input line until the input ends
    ///
    /// Lines that are not events, including ones that are not UTF-8, are logged and skipped.
    /// Only a failure to read the input ends the loop early.
    pub fn run<B: BufRead>(&mut self, input: B) -> Result<()> {
        self.handle(&PackageEvent::Started);

        for line in input.split(b'\n') {
            let line = line?;
            let line = match std::str::from_utf8(&line) {
                Ok(line) => line.trim(),
                Err(e) => {
                    warn!("Skipping event line that is not UTF-8: {e}");
                    continue;
                }
            };
            if line.is_empty() {
                continue;
            }

            match line.parse::<PackageEvent>() {
                Ok(event) => self.handle(&event),
                Err(e) => warn!("{e}"),
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::SyncMessage,
        testing::{FakePackage, FakeRegistry, RecordingServiceManager},
    };
    use similar_asserts::assert_eq;
    use std::io::Cursor;
    use tracing_test::traced_test;

    fn source(
        registry: &FakeRegistry,
        manager: &RecordingServiceManager,
    ) -> EventSource<FakeRegistry, RecordingServiceManager> {
        EventSource::new(PlatformService::new(
            Some(registry.clone()),
            manager.clone(),
        ))
    }

    fn messages(manager: &RecordingServiceManager) -> Result<Vec<SyncMessage>> {
        manager
            .calls()
            .iter()
            .map(|(_, data)| SyncMessage::decode(data))
            .collect()
    }

    fn added_packages(message: &SyncMessage) -> Vec<&str> {
        message.added.iter().map(|e| e.package_id.as_str()).collect()
    }

    #[test]
    fn parse_events() -> Result<()> {
        assert_eq!("start".parse::<PackageEvent>()?, PackageEvent::Started);
        assert_eq!(
            "added com.a".parse::<PackageEvent>()?,
            PackageEvent::Added("com.a".to_owned())
        );
        assert_eq!(
            "  changed   com.a ".parse::<PackageEvent>()?,
            PackageEvent::Changed("com.a".to_owned())
        );
        assert_eq!(
            "removed com.a".parse::<PackageEvent>()?,
            PackageEvent::Removed {
                package: "com.a".to_owned(),
                replacing: false
            }
        );
        assert_eq!(
            "removed com.a replacing".parse::<PackageEvent>()?,
            PackageEvent::Removed {
                package: "com.a".to_owned(),
                replacing: true
            }
        );

        for bad in ["", "added", "installed com.a", "removed com.a now"] {
            assert!(matches!(
                bad.parse::<PackageEvent>(),
                Err(Error::BadEvent(_))
            ));
        }

        Ok(())
    }

    #[test]
    fn display_round_trips() -> Result<()> {
        let events = [
            PackageEvent::Started,
            PackageEvent::Added("com.a".to_owned()),
            PackageEvent::Changed("com.b".to_owned()),
            PackageEvent::Removed {
                package: "com.c".to_owned(),
                replacing: true,
            },
        ];

        for event in events {
            assert_eq!(event.to_string().parse::<PackageEvent>()?, event);
        }

        Ok(())
    }

    #[test]
    fn start_sends_full_sync() -> Result<()> {
        let registry = FakeRegistry::default();
        registry.install(FakePackage::launchable("com.a"));
        registry.install(FakePackage::launchable("com.b").not_launchable());
        let manager = RecordingServiceManager::default();

        source(&registry, &manager).handle(&PackageEvent::Started);

        let messages = messages(&manager)?;
        assert_eq!(messages.len(), 1);
        assert_eq!(added_packages(&messages[0]), vec!["com.a"]);
        assert!(messages[0].removed.is_empty());

        Ok(())
    }

    #[test]
    fn replacing_removal_sends_nothing() {
        let manager = RecordingServiceManager::default();

        source(&FakeRegistry::default(), &manager).handle(&PackageEvent::Removed {
            package: "com.c".to_owned(),
            replacing: true,
        });

        assert!(manager.calls().is_empty());
    }

    #[test]
    fn removal_sends_single_removal() -> Result<()> {
        let manager = RecordingServiceManager::default();

        source(&FakeRegistry::default(), &manager).handle(&PackageEvent::Removed {
            package: "com.c".to_owned(),
            replacing: false,
        });

        assert_eq!(messages(&manager)?, vec![SyncMessage::removal("com.c")]);

        Ok(())
    }

    #[test]
    fn bursts_are_not_coalesced() -> Result<()> {
        let registry = FakeRegistry::default();
        let manager = RecordingServiceManager::default();
        let mut source = source(&registry, &manager);

        for package in ["com.a", "com.b", "com.c"] {
            registry.install(FakePackage::launchable(package));
            source.handle(&PackageEvent::Added(package.to_owned()));
        }

        let messages = messages(&manager)?;
        assert_eq!(messages.len(), 3);
        // Each message reflects the registry at the time of its event
        assert_eq!(added_packages(&messages[0]), vec!["com.a"]);
        assert_eq!(added_packages(&messages[1]), vec!["com.a", "com.b"]);
        assert_eq!(added_packages(&messages[2]), vec!["com.a", "com.b", "com.c"]);

        Ok(())
    }

    #[test]
    fn changed_package_triggers_full_sync() -> Result<()> {
        let registry = FakeRegistry::default();
        registry.install(FakePackage::launchable("com.a").with_label("Before"));
        let manager = RecordingServiceManager::default();
        let mut source = source(&registry, &manager);

        registry.uninstall("com.a");
        registry.install(FakePackage::launchable("com.a").with_label("After"));
        registry.install(FakePackage::launchable("com.z"));
        source.handle(&PackageEvent::Changed("com.a".to_owned()));

        let messages = messages(&manager)?;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].added[0].display_name, "After");
        assert_eq!(messages[0].added.len(), 2);

        Ok(())
    }

    #[test]
    fn unreachable_host_sends_nothing() -> Result<()> {
        let registry = FakeRegistry::default();
        registry.install(FakePackage::launchable("com.a"));
        let manager = RecordingServiceManager::default();
        manager.set_available(false);

        let input = "added com.b\nchanged com.a\nremoved com.a\nremoved com.b replacing\n";
        source(&registry, &manager).run(Cursor::new(input))?;

        assert!(manager.calls().is_empty());
        // The start and every event that could send retried the lookup
        assert_eq!(manager.lookups().len(), 5);

        Ok(())
    }

    #[test]
    #[traced_test]
    fn run_handles_events_in_order() -> Result<()> {
        let registry = FakeRegistry::default();
        registry.install(FakePackage::launchable("com.a"));
        let manager = RecordingServiceManager::default();

        let input = "added com.a\n\nbogus line\nremoved com.gone\nremoved com.a replacing\n";
        source(&registry, &manager).run(Cursor::new(input))?;

        let messages = messages(&manager)?;
        assert_eq!(messages.len(), 3);
        assert_eq!(added_packages(&messages[0]), vec!["com.a"]);
        assert_eq!(added_packages(&messages[1]), vec!["com.a"]);
        assert_eq!(messages[2], SyncMessage::removal("com.gone"));
        assert!(logs_contain("could not parse package event 'bogus line'"));

        Ok(())
    }

    #[test]
    #[traced_test]
    fn invalid_utf8_line_is_skipped() -> Result<()> {
        let registry = FakeRegistry::default();
        registry.install(FakePackage::launchable("com.a"));
        let manager = RecordingServiceManager::default();

        let input = b"added com.a\n\xff\xfe\nremoved com.gone\n".to_vec();
        source(&registry, &manager).run(Cursor::new(input))?;

        let messages = messages(&manager)?;
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2], SyncMessage::removal("com.gone"));
        assert!(logs_contain("Skipping event line that is not UTF-8"));

        Ok(())
    }
}
