use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

/// Display fields of the patient's assigned doctor, cached in the session so
/// appointment lists can render without an extra lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssignedDoctor {
    pub doctor_id: Uuid,
    pub nombre: String,
    pub especialidad: String,
}

/// Per-patient session state, passed explicitly to every lifecycle call.
/// Exactly one doctor assignment at a time; reassignment replaces it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientSession {
    pub patient_id: Uuid,
    pub affiliated: bool,
    pub assigned_doctor: Option<AssignedDoctor>,
}

impl PatientSession {
    pub fn new(patient_id: Uuid, affiliated: bool) -> Self {
        Self {
            patient_id,
            affiliated,
            assigned_doctor: None,
        }
    }
}

/// File-backed session store: loaded once at process start, written back on
/// every mutation.
pub struct SessionStore {
    path: PathBuf,
    sessions: RwLock<HashMap<Uuid, PatientSession>>,
}

impl SessionStore {
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let sessions = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Session store at {:?} is corrupt ({}), starting empty", path, e);
                HashMap::new()
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                warn!("Could not read session store at {:?}: {}", path, e);
                HashMap::new()
            }
        };

        Self {
            path,
            sessions: RwLock::new(sessions),
        }
    }

    pub fn get(&self, patient_id: Uuid) -> Option<PatientSession> {
        self.sessions
            .read()
            .ok()
            .and_then(|map| map.get(&patient_id).cloned())
    }

    pub fn put(&self, session: PatientSession) {
        if let Ok(mut map) = self.sessions.write() {
            map.insert(session.patient_id, session);
            self.persist(&map);
        }
    }

    fn persist(&self, map: &HashMap<Uuid, PatientSession>) {
        match serde_json::to_string_pretty(map) {
            Ok(raw) => {
                if let Err(e) = fs::write(&self.path, raw) {
                    warn!("Could not persist session store to {:?}: {}", self.path, e);
                }
            }
            Err(e) => warn!("Could not serialize session store: {}", e),
        }
    }
}
