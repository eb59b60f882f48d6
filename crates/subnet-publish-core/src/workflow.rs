//! Publication workflow
//!
//! CheckExisting → CollectMetadata → AssembleArtifacts → GetRepo → Publish.
//! Every step fails fast; nothing is retried or rolled back.

use std::fs;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::error::{PublishError, Result};
use crate::layout::Layout;
use crate::metadata::{collect_metadata, PublicationMetadata};
use crate::prompt::Prompter;
use crate::publisher::{ArtifactSet, Publisher, PublisherFactory};
use crate::registry::{validate_subnet_name, RegistryScanner, SubnetDefinition, VmDefinition};
use crate::sidecar::Sidecar;

const SUBNET_ARTIFACT: &str = "subnet.toml";
const VM_ARTIFACT: &str = "vm.toml";

/// What a publish run needs from its environment
pub struct PublishContext<'a> {
    pub layout: &'a Layout,
    pub prompter: &'a dyn Prompter,
}

impl<'a> PublishContext<'a> {
    pub fn new(layout: &'a Layout, prompter: &'a dyn Prompter) -> Self {
        Self { layout, prompter }
    }

    pub fn scanner(&self) -> RegistryScanner {
        RegistryScanner::new(self.layout.repos_dir())
    }
}

/// Publish `subnet_name` into the registry the operator picks
///
/// Republishing a claimed name is rejected with `AlreadyPublished` before any
/// prompt is shown or publisher is built. A sidecar naming a different subnet
/// is rejected with `SidecarMismatch`; an unnamed sidecar takes `subnet_name`.
pub fn do_publish<F>(
    ctx: &PublishContext<'_>,
    sidecar: &Sidecar,
    subnet_name: &str,
    publisher_factory: F,
) -> Result<()>
where
    F: PublisherFactory,
{
    validate_subnet_name(subnet_name)?;
    if !sidecar.name.is_empty() && sidecar.name != subnet_name {
        return Err(PublishError::SidecarMismatch {
            expected: subnet_name.to_string(),
            found: sidecar.name.clone(),
        });
    }
    let scanner = ctx.scanner();

    debug!(subnet = subnet_name, "checking existing registries");
    if let Some(alias) = scanner.find_published(subnet_name)? {
        return Err(PublishError::AlreadyPublished {
            name: subnet_name.to_string(),
            alias,
        });
    }

    let known_aliases = scanner.aliases()?;
    let metadata = collect_metadata(ctx.prompter, &known_aliases)?;

    debug!(subnet = subnet_name, vm = %sidecar.vm, "assembling artifacts");
    let artifacts = assemble_artifacts(ctx.layout, sidecar, subnet_name, &metadata)?;

    let repo_dir = scanner.repo_dir(&metadata.repo_alias);
    let subnet_dir = ctx.layout.subnet_dir(subnet_name);
    let publisher = publisher_factory.create(&repo_dir, scanner.root(), &subnet_dir);

    let repo = publisher
        .get_repo()
        .map_err(|e| repository_access_failed(repo_dir.clone(), e))?;
    debug!(path = %repo.path.display(), created = repo.created, "registry repository ready");

    publisher
        .publish(
            &repo,
            &metadata.repo_alias,
            &metadata.repo_url,
            &metadata.maintainers,
            &artifacts,
        )
        .map_err(|e| publish_failed(subnet_name, e))?;

    info!(
        subnet = subnet_name,
        alias = %metadata.repo_alias,
        version = %metadata.version,
        "published subnet"
    );
    Ok(())
}

/// Render the definitions for the sidecar's VM kind into the staging directory
pub fn assemble_artifacts(
    layout: &Layout,
    sidecar: &Sidecar,
    subnet_name: &str,
    metadata: &PublicationMetadata,
) -> Result<ArtifactSet> {
    let subnet_dir = layout.subnet_dir(subnet_name);
    let vm = VmDefinition::for_sidecar(sidecar, subnet_name, &subnet_dir, metadata)?;
    let subnet = SubnetDefinition::new(subnet_name, metadata);

    let staging = layout.staging_dir(subnet_name);
    fs::create_dir_all(&staging)?;

    let subnet_definition = staging.join(SUBNET_ARTIFACT);
    fs::write(&subnet_definition, subnet.to_toml()?)?;
    let vm_definition = staging.join(VM_ARTIFACT);
    fs::write(&vm_definition, vm.to_toml()?)?;

    Ok(ArtifactSet {
        subnet_name: subnet_name.to_string(),
        version: metadata.version.clone(),
        subnet_definition,
        vm_definition,
    })
}

fn repository_access_failed(path: PathBuf, err: PublishError) -> PublishError {
    match err {
        PublishError::RepositoryAccessFailed { .. } => err,
        other => PublishError::RepositoryAccessFailed {
            path,
            message: other.to_string(),
        },
    }
}

fn publish_failed(subnet_name: &str, err: PublishError) -> PublishError {
    match err {
        PublishError::PublishFailed { .. } | PublishError::AlreadyPublished { .. } => err,
        other => PublishError::PublishFailed {
            name: subnet_name.to_string(),
            message: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{SUBNET_DIR, VM_DIR};
    use crate::metadata::tests::ScriptedPrompter;
    use crate::publisher::RepositoryHandle;
    use crate::sidecar::VmKind;
    use std::cell::RefCell;
    use std::path::Path;
    use std::rc::Rc;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        GetRepo,
        Publish {
            alias: String,
            url: String,
            maintainers: Vec<String>,
            subnet_name: String,
        },
    }

    /// Records calls; optionally fails one of them
    #[derive(Clone, Default)]
    struct RecordingPublisher {
        calls: Rc<RefCell<Vec<Call>>>,
        fail_get_repo: bool,
        fail_publish: bool,
    }

    impl Publisher for RecordingPublisher {
        fn get_repo(&self) -> Result<RepositoryHandle> {
            self.calls.borrow_mut().push(Call::GetRepo);
            if self.fail_get_repo {
                return Err(PublishError::Git("clone refused".to_string()));
            }
            Ok(RepositoryHandle {
                path: PathBuf::from("/dev/null/repo"),
                created: true,
            })
        }

        fn publish(
            &self,
            _repo: &RepositoryHandle,
            alias: &str,
            url: &str,
            maintainers: &[String],
            artifacts: &ArtifactSet,
        ) -> Result<()> {
            self.calls.borrow_mut().push(Call::Publish {
                alias: alias.to_string(),
                url: url.to_string(),
                maintainers: maintainers.to_vec(),
                subnet_name: artifacts.subnet_name.clone(),
            });
            if self.fail_publish {
                return Err(PublishError::Git("push rejected".to_string()));
            }
            Ok(())
        }
    }

    fn setup() -> (TempDir, Layout) {
        let temp = TempDir::new().unwrap();
        let layout = Layout::with_base(temp.path().to_path_buf());
        fs::create_dir_all(layout.repos_dir()).unwrap();
        (temp, layout)
    }

    fn sidecar() -> Sidecar {
        Sidecar::new("testSubnet", VmKind::SubnetEvm)
    }

    #[test]
    fn happy_path_calls_publisher_once_each() {
        let (_temp, layout) = setup();
        let prompter = ScriptedPrompter::happy();
        let ctx = PublishContext::new(&layout, &prompter);
        let publisher = RecordingPublisher::default();
        let calls = publisher.calls.clone();

        do_publish(&ctx, &sidecar(), "testSubnet", |_: &Path, _: &Path, _: &Path| {
            publisher
        })
        .unwrap();

        assert_eq!(
            *calls.borrow(),
            vec![
                Call::GetRepo,
                Call::Publish {
                    alias: "testAlias".to_string(),
                    url: "https://localhost:12345".to_string(),
                    maintainers: vec!["dummy".to_string(), "stuff".to_string()],
                    subnet_name: "testSubnet".to_string(),
                },
            ]
        );
    }

    #[test]
    fn factory_receives_layout_paths() {
        let (_temp, layout) = setup();
        let prompter = ScriptedPrompter::happy();
        let ctx = PublishContext::new(&layout, &prompter);
        let seen = RefCell::new(None);

        do_publish(
            &ctx,
            &sidecar(),
            "testSubnet",
            |repo_dir: &Path, repos_path: &Path, subnet_dir: &Path| {
                *seen.borrow_mut() = Some((
                    repo_dir.to_path_buf(),
                    repos_path.to_path_buf(),
                    subnet_dir.to_path_buf(),
                ));
                RecordingPublisher::default()
            },
        )
        .unwrap();

        let (repo_dir, repos_path, subnet_dir) = seen.into_inner().unwrap();
        assert_eq!(repo_dir, layout.repo_dir("testAlias"));
        assert_eq!(repos_path, layout.repos_dir());
        assert_eq!(subnet_dir, layout.subnet_dir("testSubnet"));
    }

    #[test]
    fn already_published_skips_prompts_and_publisher() {
        let (_temp, layout) = setup();
        let area = layout.repo_dir("dummyRepo").join(SUBNET_DIR);
        fs::create_dir_all(&area).unwrap();
        fs::write(area.join("testSubnet"), "").unwrap();

        let prompter = ScriptedPrompter::happy();
        let ctx = PublishContext::new(&layout, &prompter);
        let built = RefCell::new(false);

        let err = do_publish(&ctx, &sidecar(), "testSubnet", |_: &Path, _: &Path, _: &Path| {
            *built.borrow_mut() = true;
            RecordingPublisher::default()
        })
        .unwrap_err();

        match err {
            PublishError::AlreadyPublished { name, alias } => {
                assert_eq!(name, "testSubnet");
                assert_eq!(alias, "dummyRepo");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!*built.borrow());
        assert!(prompter.asked.borrow().is_empty());
    }

    #[test]
    fn vm_area_match_still_publishes() {
        let (_temp, layout) = setup();
        fs::create_dir_all(layout.repo_dir("dummyRepo").join(VM_DIR).join("testSubnet")).unwrap();

        let prompter = ScriptedPrompter::happy();
        let ctx = PublishContext::new(&layout, &prompter);
        let publisher = RecordingPublisher::default();
        let calls = publisher.calls.clone();

        do_publish(&ctx, &sidecar(), "testSubnet", |_: &Path, _: &Path, _: &Path| {
            publisher
        })
        .unwrap();
        assert_eq!(calls.borrow().len(), 2);
    }

    #[test]
    fn metadata_failure_never_builds_publisher() {
        let (_temp, layout) = setup();
        let mut prompter = ScriptedPrompter::happy();
        prompter.version = None;
        let ctx = PublishContext::new(&layout, &prompter);
        let built = RefCell::new(false);

        let err = do_publish(&ctx, &sidecar(), "testSubnet", |_: &Path, _: &Path, _: &Path| {
            *built.borrow_mut() = true;
            RecordingPublisher::default()
        })
        .unwrap_err();

        assert!(matches!(err, PublishError::MetadataCaptureFailed { .. }));
        assert!(!*built.borrow());
    }

    #[test]
    fn get_repo_failure_is_repository_access() {
        let (_temp, layout) = setup();
        let prompter = ScriptedPrompter::happy();
        let ctx = PublishContext::new(&layout, &prompter);
        let publisher = RecordingPublisher {
            fail_get_repo: true,
            ..RecordingPublisher::default()
        };
        let calls = publisher.calls.clone();

        let err = do_publish(&ctx, &sidecar(), "testSubnet", |_: &Path, _: &Path, _: &Path| {
            publisher
        })
        .unwrap_err();

        assert!(matches!(err, PublishError::RepositoryAccessFailed { .. }));
        assert_eq!(*calls.borrow(), vec![Call::GetRepo]);
    }

    #[test]
    fn publish_failure_is_propagated() {
        let (_temp, layout) = setup();
        let prompter = ScriptedPrompter::happy();
        let ctx = PublishContext::new(&layout, &prompter);
        let publisher = RecordingPublisher {
            fail_publish: true,
            ..RecordingPublisher::default()
        };

        let err = do_publish(&ctx, &sidecar(), "testSubnet", |_: &Path, _: &Path, _: &Path| {
            publisher
        })
        .unwrap_err();

        match err {
            PublishError::PublishFailed { name, message } => {
                assert_eq!(name, "testSubnet");
                assert!(message.contains("push rejected"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn sidecar_for_another_subnet_is_rejected() {
        let (_temp, layout) = setup();
        let prompter = ScriptedPrompter::happy();
        let ctx = PublishContext::new(&layout, &prompter);
        let built = RefCell::new(false);

        let err = do_publish(
            &ctx,
            &Sidecar::new("otherSubnet", VmKind::SubnetEvm),
            "testSubnet",
            |_: &Path, _: &Path, _: &Path| {
                *built.borrow_mut() = true;
                RecordingPublisher::default()
            },
        )
        .unwrap_err();

        match err {
            PublishError::SidecarMismatch { expected, found } => {
                assert_eq!(expected, "testSubnet");
                assert_eq!(found, "otherSubnet");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!*built.borrow());
        assert!(prompter.asked.borrow().is_empty());
    }

    #[test]
    fn unnamed_sidecar_takes_subnet_name() {
        let (_temp, layout) = setup();
        let prompter = ScriptedPrompter::happy();
        let ctx = PublishContext::new(&layout, &prompter);
        let publisher = RecordingPublisher::default();
        let calls = publisher.calls.clone();

        do_publish(
            &ctx,
            &Sidecar::new("", VmKind::SubnetEvm),
            "testSubnet",
            |_: &Path, _: &Path, _: &Path| publisher,
        )
        .unwrap();
        assert_eq!(calls.borrow().len(), 2);
    }

    #[test]
    fn custom_vm_without_binary_stops_before_publisher() {
        let (_temp, layout) = setup();
        let prompter = ScriptedPrompter::happy();
        let ctx = PublishContext::new(&layout, &prompter);
        let built = RefCell::new(false);

        let err = do_publish(
            &ctx,
            &Sidecar::new("testSubnet", VmKind::CustomVm),
            "testSubnet",
            |_: &Path, _: &Path, _: &Path| {
                *built.borrow_mut() = true;
                RecordingPublisher::default()
            },
        )
        .unwrap_err();

        assert!(matches!(err, PublishError::MissingVmBinary { .. }));
        assert!(!*built.borrow());
    }

    #[test]
    fn assemble_writes_both_definitions() {
        let (_temp, layout) = setup();
        let metadata = PublicationMetadata {
            repo_alias: "testAlias".to_string(),
            repo_url: "https://localhost:12345".to_string(),
            maintainers: vec!["dummy".to_string()],
            description: String::new(),
            homepage: String::new(),
            version: "v0.9.99".to_string(),
        };

        let set = assemble_artifacts(&layout, &sidecar(), "testSubnet", &metadata).unwrap();

        assert_eq!(set.version, "v0.9.99");
        assert!(set.subnet_definition.starts_with(layout.staging_dir("testSubnet")));

        let vm: VmDefinition =
            toml::from_str(&fs::read_to_string(&set.vm_definition).unwrap()).unwrap();
        assert_eq!(vm.kind, VmKind::SubnetEvm);
        let subnet: SubnetDefinition =
            toml::from_str(&fs::read_to_string(&set.subnet_definition).unwrap()).unwrap();
        assert_eq!(subnet.maintainers, vec!["dummy"]);
    }
}
