//! Gateway lifecycle: install, activate, and the skip-waiting signal.
//!
//! Install pre-populates the versioned shell namespace atomically: every
//! manifest resource is fetched before a single entry is written, so a
//! later activation never observes a partially populated shell.
//! Activation sweeps every namespace outside the keep set and then
//! claims control.

use std::sync::atomic::Ordering;

use reqwest::Url;

use salah_core::Error;

use super::Gateway;

/// Where the gateway is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    New = 0,
    /// Shell pre-cache complete; ready to take over immediately.
    Installed = 1,
    /// Namespace sweep done, control claimed.
    Active = 2,
}

impl LifecycleState {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => LifecycleState::Installed,
            2 => LifecycleState::Active,
            _ => LifecycleState::New,
        }
    }
}

/// Out-of-band command from the foreground application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateSignal {
    /// Activate the newly installed version immediately instead of
    /// waiting for the natural lifecycle transition.
    SkipWaiting,
}

impl Gateway {
    pub fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn set_state(&self, state: LifecycleState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }

    /// Pre-cache the shell manifest into the versioned shell namespace.
    ///
    /// All-or-nothing: every manifest resource is fetched up front and
    /// only then written, so a failed install leaves the namespace
    /// empty. A transport failure or non-2xx status on any entry aborts
    /// the whole step with `Error::PrecacheFailed`.
    pub async fn install(&self) -> Result<(), Error> {
        let namespace = self.config.shell_namespace.clone();
        self.store.open_namespace(&namespace).await?;

        let mut fetched = Vec::with_capacity(self.config.shell_manifest.len());
        for path in &self.config.shell_manifest {
            let url = self.shell_url(path)?;
            let response = self
                .fetcher
                .get(&url)
                .await
                .map_err(|e| Error::PrecacheFailed(format!("{path}: {e}")))?;
            let stored = response.to_stored();
            if !stored.is_success() {
                return Err(Error::PrecacheFailed(format!("{path}: status {}", stored.status)));
            }
            fetched.push((url, stored));
        }

        for (url, stored) in &fetched {
            let key = salah_core::cache::compute_entry_key("GET", url.as_str());
            self.store.put(&namespace, &key, url.as_str(), stored).await?;
        }

        self.set_state(LifecycleState::Installed);
        tracing::info!(namespace = %namespace, entries = fetched.len(), "shell pre-cache complete, ready to activate");
        Ok(())
    }

    /// Sweep superseded namespaces and claim control.
    ///
    /// Only valid once install has populated the current shell: sweeping
    /// before that would delete the previous deploy's shell and leave
    /// nothing to serve. Every namespace outside {shell version, data,
    /// cdn} is deleted; the two stable namespaces are (re)opened so later
    /// strategies always find them.
    pub async fn activate(&self) -> Result<(), Error> {
        if self.state() != LifecycleState::Installed {
            return Err(Error::Lifecycle(format!(
                "cannot activate from {:?}, a successful install must come first",
                self.state()
            )));
        }
        let keep = self.config.keep_set();

        for name in self.store.list_namespaces().await? {
            if !keep.contains(&name.as_str()) {
                self.store.delete_namespace(&name).await?;
                tracing::info!(namespace = %name, "purged stale cache namespace");
            }
        }

        for name in keep {
            self.store.open_namespace(name).await?;
        }

        self.set_state(LifecycleState::Active);
        tracing::info!(shell = %self.config.shell_namespace, "gateway active");
        Ok(())
    }

    /// Handle an out-of-band update signal.
    ///
    /// `SkipWaiting` activates an installed-but-waiting gateway right
    /// away; in any other state the signal is ignored.
    pub async fn signal(&self, signal: UpdateSignal) -> Result<(), Error> {
        match signal {
            UpdateSignal::SkipWaiting => {
                if self.state() == LifecycleState::Installed {
                    self.activate().await
                } else {
                    tracing::debug!(state = ?self.state(), "skip-waiting signal ignored");
                    Ok(())
                }
            }
        }
    }

    fn shell_url(&self, path: &str) -> Result<Url, Error> {
        Url::parse(&self.config.app_origin)
            .and_then(|origin| origin.join(path))
            .map_err(|e| Error::InvalidUrl(format!("{path}: {e}")))
    }
}
