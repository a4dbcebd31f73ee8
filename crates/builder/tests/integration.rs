//! Integration tests for the fetch, build and package stages

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use llvmpkg_builder::*;
    use llvmpkg_config::{Config, SourceVariant, TemplateKind};
    use llvmpkg_errors::{BuildError, Error, NetworkError};
    use llvmpkg_events::{channel, AppEvent, BuildEvent, EventReceiver, GeneralEvent, Stage};
    use llvmpkg_net::NetClient;
    use llvmpkg_types::Settings;
    use std::collections::BTreeMap;
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use tempfile::tempdir;

    // (path, contents) of every fixture archive
    const FIXTURE: &[(&str, &[u8])] = &[
        ("widget-1.0.src/README", b"widget readme\n"),
        ("widget-1.0.src/lib/core.c", b"int core(void) { return 0; }\n"),
        ("widget-1.0.src/include/widget/core.h", b"int core(void);\n"),
    ];

    fn tar_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (path, data) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, path, *data).unwrap();
        }
        builder.into_inner().unwrap()
    }

    fn zip_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        for (path, data) in files {
            zip.start_file(*path, options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    async fn compress(format: ArchiveFormat, data: &[u8]) -> Vec<u8> {
        use async_compression::tokio::bufread::{BzEncoder, GzipEncoder, XzEncoder};

        let mut out = Vec::new();
        match format {
            ArchiveFormat::TarGz => {
                tokio::io::copy(&mut GzipEncoder::new(data), &mut out)
                    .await
                    .unwrap();
            }
            ArchiveFormat::TarBz2 => {
                tokio::io::copy(&mut BzEncoder::new(data), &mut out)
                    .await
                    .unwrap();
            }
            ArchiveFormat::TarXz => {
                tokio::io::copy(&mut XzEncoder::new(data), &mut out)
                    .await
                    .unwrap();
            }
            ArchiveFormat::Tar | ArchiveFormat::Zip => out.extend_from_slice(data),
        }
        out
    }

    /// Relative path → contents of every file under `root`
    fn read_tree(root: &Path) -> BTreeMap<String, Vec<u8>> {
        fn walk(root: &Path, dir: &Path, out: &mut BTreeMap<String, Vec<u8>>) {
            for entry in std::fs::read_dir(dir).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    walk(root, &path, out);
                } else {
                    let relative = path.strip_prefix(root).unwrap();
                    let key = relative.to_string_lossy().replace('\\', "/");
                    out.insert(key, std::fs::read(&path).unwrap());
                }
            }
        }
        let mut out = BTreeMap::new();
        if root.exists() {
            walk(root, root, &mut out);
        }
        out
    }

    fn drain(rx: &mut EventReceiver) -> Vec<AppEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn fixture_tree() -> BTreeMap<String, Vec<u8>> {
        FIXTURE
            .iter()
            .map(|(path, data)| ((*path).to_string(), data.to_vec()))
            .collect()
    }

    #[tokio::test]
    async fn extraction_reproduces_packed_files() {
        let cases = [
            ("widget.zip", ArchiveFormat::Zip),
            ("widget.tar", ArchiveFormat::Tar),
            ("widget.tar.gz", ArchiveFormat::TarGz),
            ("widget.tar.bz2", ArchiveFormat::TarBz2),
            ("widget.tar.xz", ArchiveFormat::TarXz),
        ];

        for (name, format) in cases {
            let temp = tempdir().unwrap();
            let bytes = if format == ArchiveFormat::Zip {
                zip_bytes(FIXTURE)
            } else {
                compress(format, &tar_bytes(FIXTURE)).await
            };
            let archive = temp.path().join(name);
            std::fs::write(&archive, bytes).unwrap();

            let dest = temp.path().join("out");
            std::fs::create_dir_all(&dest).unwrap();
            extract_archive(&archive, &dest).await.unwrap();

            assert_eq!(read_tree(&dest), fixture_tree(), "{name}");
        }
    }

    #[tokio::test]
    async fn zip_entry_escaping_destination_is_rejected() {
        let temp = tempdir().unwrap();
        let archive = temp.path().join("evil.zip");
        std::fs::write(&archive, zip_bytes(&[("../evil.txt", b"boom")])).unwrap();

        let dest = temp.path().join("out");
        std::fs::create_dir_all(&dest).unwrap();
        let err = extract_archive(&archive, &dest).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Build(BuildError::ExtractionFailed { .. })
        ));
        assert!(!temp.path().join("evil.txt").exists());
    }

    #[tokio::test]
    async fn relocation_moves_extracted_tree() {
        let temp = tempdir().unwrap();
        let archive = temp.path().join("widget.tar.gz");
        std::fs::write(&archive, compress(ArchiveFormat::TarGz, &tar_bytes(FIXTURE)).await)
            .unwrap();
        extract_archive(&archive, temp.path()).await.unwrap();

        let extracted = temp.path().join("widget-1.0.src");
        let before = read_tree(&extracted);
        let destination = temp.path().join("src/projects/widget");
        relocate("widget", &extracted, &destination).await.unwrap();

        assert!(!extracted.exists());
        assert_eq!(read_tree(&destination), before);
        assert_eq!(before.len(), FIXTURE.len());
    }

    #[tokio::test]
    async fn fetch_widget_from_mock_host() {
        let server = MockServer::start_async().await;
        let body = zip_bytes(FIXTURE);
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/widget-1.0.src.zip");
                then.status(200).body(body.clone());
            })
            .await;

        let temp = tempdir().unwrap();
        let (tx, mut rx) = channel();
        let fetcher = Fetcher::new(
            NetClient::with_defaults().unwrap(),
            UrlTemplate::mirror(&server.base_url()),
            temp.path().to_path_buf(),
            temp.path().join("src"),
            tx,
        );
        let spec = ComponentSpec::new("widget", "1.0", "widget");
        let report = fetcher.fetch_all(&[spec.clone()]).await.unwrap();

        mock.assert_async().await;
        let readme = temp.path().join("src/widget/README");
        assert_eq!(std::fs::read(readme).unwrap(), b"widget readme\n");
        assert_eq!(report.components, vec!["widget-1.0".to_string()]);
        assert_eq!(report.bytes_downloaded, body.len() as u64);

        // Archive is removed once extracted
        assert!(!temp.path().join("widget-1.0.src.zip").exists());

        let manifest = SourceManifest::load(&temp.path().join("src")).await.unwrap();
        assert_eq!(manifest.components, vec![spec]);

        let staged = drain(&mut rx).into_iter().any(|event| {
            matches!(
                event,
                AppEvent::Build(BuildEvent::ComponentStaged { ref component, .. })
                    if component == "widget"
            )
        });
        assert!(staged);
    }

    #[tokio::test]
    async fn missing_archive_is_http_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/widget-1.0.src.zip");
                then.status(404);
            })
            .await;

        let temp = tempdir().unwrap();
        let (tx, _rx) = channel();
        let fetcher = Fetcher::new(
            NetClient::with_defaults().unwrap(),
            UrlTemplate::mirror(&server.base_url()),
            temp.path().to_path_buf(),
            temp.path().join("src"),
            tx,
        );
        let err = fetcher
            .fetch_component(&ComponentSpec::new("widget", "1.0", "widget"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Network(NetworkError::HttpError { status: 404, .. })
        ));
        assert!(!temp.path().join("src/widget").exists());
    }

    #[tokio::test]
    async fn unknown_archive_format_is_rejected_before_download() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(200).body("x");
            })
            .await;

        let temp = tempdir().unwrap();
        let (tx, _rx) = channel();
        let template =
            UrlTemplate::custom(format!("{}/{{component}}-{{version}}.7z", server.base_url()))
                .unwrap();
        let fetcher = Fetcher::new(
            NetClient::with_defaults().unwrap(),
            template,
            temp.path().to_path_buf(),
            temp.path().join("src"),
            tx,
        );
        let err = fetcher
            .fetch_component(&ComponentSpec::new("widget", "1.0", "widget"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Build(BuildError::UnsupportedArchiveFormat { .. })
        ));
        assert_eq!(mock.hits_async().await, 0);
    }

    #[tokio::test]
    async fn enabled_toggle_without_component_fails_before_tool_runs() {
        let temp = tempdir().unwrap();
        let layout = BuildLayout::new(
            temp.path().join("src"),
            temp.path().join("build"),
            temp.path().join("install"),
        );
        let manifest = SourceManifest {
            components: vec![ComponentSpec::new("llvm", "3.8.0", ".")],
        };
        let mut configuration = LlvmRecipe::new("3.8.0", SourceVariant::Minimal)
            .build_configuration(Settings::host(), &llvmpkg_config::BuildConfig::default());
        configuration
            .toggles
            .push(FeatureToggle::on("LLVM_TOOL_CLANG_BUILD").requires("cfe"));

        let (tx, mut rx) = channel();
        let err = Builder::cmake("llvmpkg-no-such-cmake", tx)
            .build(&layout, &configuration, &manifest)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Build(BuildError::MissingComponent { ref component, .. }) if component == "cfe"
        ));
        assert!(!layout.build_dir.exists());
        assert!(!drain(&mut rx)
            .iter()
            .any(|event| matches!(event, AppEvent::Build(BuildEvent::ToolInvoked { .. }))));
    }

    #[tokio::test]
    async fn packaging_is_independent_of_rule_order() {
        let temp = tempdir().unwrap();
        let install = temp.path().join("install");
        populate_install_tree(&install);

        let mut orders = vec![default_rules()];
        let mut reversed = default_rules();
        reversed.reverse();
        orders.push(reversed);
        let mut rotated = default_rules();
        rotated.rotate_left(4);
        orders.push(rotated);

        let mut results = Vec::new();
        for (i, rules) in orders.into_iter().enumerate() {
            let (tx, _rx) = channel();
            let package = temp.path().join(format!("package-{i}"));
            let report = Packager::new(rules, tx)
                .package(&install, &package)
                .await
                .unwrap();
            results.push((report.files, read_tree(&package)));
        }

        let (files, tree) = &results[0];
        assert_eq!(files.get("lib"), Some(&4));
        assert!(tree.contains_key("lib/cmake/llvm/LLVMConfig.cmake"));
        assert!(!tree.contains_key("lib/notes.txt"));
        for other in &results[1..] {
            assert_eq!(&results[0], other);
        }
    }

    #[tokio::test]
    async fn rule_without_matches_leaves_category_absent() {
        let temp = tempdir().unwrap();
        let install = temp.path().join("install");
        std::fs::create_dir_all(install.join("include/llvm")).unwrap();
        std::fs::write(install.join("include/llvm/Config.h"), b"#define X 1\n").unwrap();
        // present but matched by no lib pattern
        std::fs::create_dir_all(install.join("lib")).unwrap();
        std::fs::write(install.join("lib/README.txt"), b"docs").unwrap();

        let (tx, _rx) = channel();
        let package = temp.path().join("package");
        let report = Packager::with_default_rules(tx)
            .package(&install, &package)
            .await
            .unwrap();

        assert_eq!(report.files.len(), 1);
        assert_eq!(report.files.get("include"), Some(&1));
        for absent in ["lib", "share", "bin", "libexec"] {
            assert!(!package.join(absent).exists(), "{absent}");
        }
        // install tree untouched
        assert_eq!(read_tree(&install).len(), 2);
    }

    fn populate_install_tree(install: &Path) {
        let files: &[(&str, &[u8])] = &[
            ("include/llvm/Config.h", b"config"),
            ("include/llvm-c/Core.h", b"core"),
            ("lib/libLLVMCore.a", b"archive"),
            ("lib/libLLVMCore.so", b"shared"),
            ("lib/cmake/llvm/LLVMConfig.cmake", b"cmake"),
            ("lib/clang/3.8.0/include/stddef.h", b"stddef"),
            ("lib/notes.txt", b"not packaged"),
            ("share/man/man1/clang.1", b"man"),
            ("bin/clang", b"binary"),
            ("libexec/c++-analyzer", b"script"),
        ];
        for (path, data) in files {
            let path = install.join(path);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, data).unwrap();
        }
    }

    #[tokio::test]
    async fn stage_dir_at_root_is_rejected_before_fetch() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("stage");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("precious.txt"), b"keep").unwrap();

        let mut config = Config::default();
        config.paths.root = Some(root.clone());
        config.paths.source_dir = PathBuf::from(".");

        let (tx, _rx) = channel();
        let result = Pipeline::with_client(
            config,
            Settings::host(),
            NetClient::with_defaults().unwrap(),
            tx,
        );

        assert!(matches!(result, Err(Error::Config(_))));
        assert_eq!(std::fs::read(root.join("precious.txt")).unwrap(), b"keep");
    }

    #[cfg(unix)]
    mod mock_tool {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        const SCRIPT: &str = r#"#!/bin/sh
case "$1" in
  --build)
    case "$*" in
      *"--target install"*)
        prefix=$(cat .prefix)
        mkdir -p "$prefix/include" "$prefix/lib" "$prefix/bin"
        echo header > "$prefix/include/x.h"
        echo archive > "$prefix/lib/libx.a"
        echo binary > "$prefix/bin/x"
        ;;
      *)
        @COMPILE@
        echo built > built.txt
        ;;
    esac
    ;;
  *)
    printf '%s\n' "$@" > configure.args
    for arg in "$@"; do
      case "$arg" in
        -DCMAKE_INSTALL_PREFIX=*) printf '%s' "${arg#-DCMAKE_INSTALL_PREFIX=}" > .prefix ;;
      esac
    done
    ;;
esac
"#;

        /// Stand-in for cmake; exits 3 on compile when `fail_compile`
        fn write_tool(dir: &Path, fail_compile: bool) -> PathBuf {
            let compile = if fail_compile { "exit 3" } else { ":" };
            let path = dir.join("fake-cmake");
            std::fs::write(&path, SCRIPT.replace("@COMPILE@", compile)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        fn pipeline_config(root: &Path, server: &MockServer, tool: &Path) -> Config {
            let mut config = Config::default();
            config.paths.root = Some(root.to_path_buf());
            config.source.template = TemplateKind::Custom;
            config.source.custom_template = Some(format!(
                "{}/{{component}}-{{version}}.src.tar.gz",
                server.base_url()
            ));
            config.source.variant = SourceVariant::Minimal;
            config.build.program = tool.display().to_string();
            config
        }

        async fn serve_llvm(server: &MockServer) {
            let files: &[(&str, &[u8])] = &[
                ("llvm-3.8.0.src/CMakeLists.txt", b"project(LLVM)\n"),
                ("llvm-3.8.0.src/lib/IR/Core.cpp", b"// core\n"),
            ];
            let body = compress(ArchiveFormat::TarGz, &tar_bytes(files)).await;
            server
                .mock_async(|when, then| {
                    when.method(GET).path("/llvm-3.8.0.src.tar.gz");
                    then.status(200).body(body);
                })
                .await;
        }

        #[tokio::test]
        async fn stale_build_dir_is_reset() {
            let temp = tempdir().unwrap();
            let tool = write_tool(temp.path(), false);
            let layout = BuildLayout::new(
                temp.path().join("src"),
                temp.path().join("build"),
                temp.path().join("install"),
            );
            std::fs::create_dir_all(&layout.source_dir).unwrap();
            std::fs::create_dir_all(layout.build_dir.join("old")).unwrap();
            std::fs::write(layout.build_dir.join("stale.txt"), b"old").unwrap();
            std::fs::write(layout.build_dir.join("old/obj.o"), b"old").unwrap();

            let manifest = SourceManifest {
                components: vec![ComponentSpec::new("llvm", "3.8.0", ".")],
            };
            let configuration = LlvmRecipe::new("3.8.0", SourceVariant::Minimal)
                .build_configuration(Settings::host(), &llvmpkg_config::BuildConfig::default());

            let (tx, mut rx) = channel();
            let report = Builder::cmake(tool.display().to_string(), tx)
                .build(&layout, &configuration, &manifest)
                .await
                .unwrap();

            let build_files: Vec<String> = read_tree(&layout.build_dir).into_keys().collect();
            assert_eq!(build_files, [".prefix", "built.txt", "configure.args"]);
            assert_eq!(report.install_dir, layout.install_dir);

            let args = std::fs::read_to_string(layout.build_dir.join("configure.args")).unwrap();
            let args: Vec<&str> = args.lines().collect();
            assert_eq!(args[0], layout.source_dir.display().to_string());
            assert!(args.contains(&"-DLLVM_BUILD_TESTS=OFF"));
            assert!(args.contains(&"-DLLVM_TOOL_CLANG_BUILD=OFF"));
            assert!(args.contains(&"-DBUILD_SHARED_LIBS=ON"));

            assert!(drain(&mut rx)
                .iter()
                .any(|event| matches!(event, AppEvent::Build(BuildEvent::BuildDirReset { .. }))));
        }

        #[tokio::test]
        async fn pipeline_packages_exactly_the_installed_files() {
            let server = MockServer::start_async().await;
            serve_llvm(&server).await;
            let temp = tempdir().unwrap();
            let tool = write_tool(temp.path(), false);
            let root = temp.path().join("stage");

            let (tx, mut rx) = channel();
            let pipeline = Pipeline::with_client(
                pipeline_config(&root, &server, &tool),
                Settings::host(),
                NetClient::with_defaults().unwrap(),
                tx,
            )
            .unwrap();
            let report = pipeline.run().await.unwrap();

            assert_eq!(report.package, "llvm/3.8.0");
            assert_eq!(report.fetch.components, vec!["llvm-3.8.0".to_string()]);
            assert!(root.join("src/CMakeLists.txt").exists());
            assert!(root.join("src").join(SOURCE_MANIFEST_FILE).exists());

            let package: Vec<String> = read_tree(&root.join("package")).into_keys().collect();
            assert_eq!(package, ["bin/x", "include/x.h", "lib/libx.a"]);
            assert_eq!(report.packaging.total_files(), 3);

            let events = drain(&mut rx);
            let completed: Vec<Stage> = events
                .iter()
                .filter_map(|event| match event {
                    AppEvent::Build(BuildEvent::StageCompleted { stage, .. }) => Some(*stage),
                    _ => None,
                })
                .collect();
            assert_eq!(completed, [Stage::Fetch, Stage::Build, Stage::Package]);
            assert!(matches!(
                events.first(),
                Some(AppEvent::General(GeneralEvent::OperationStarted { operation }))
                    if operation == "run llvm/3.8.0"
            ));
            assert!(matches!(
                events.last(),
                Some(AppEvent::General(GeneralEvent::OperationCompleted { .. }))
            ));
        }

        #[tokio::test]
        async fn compile_failure_stops_before_packaging() {
            let server = MockServer::start_async().await;
            serve_llvm(&server).await;
            let temp = tempdir().unwrap();
            let tool = write_tool(temp.path(), true);
            let root = temp.path().join("stage");

            let (tx, mut rx) = channel();
            let pipeline = Pipeline::with_client(
                pipeline_config(&root, &server, &tool),
                Settings::host(),
                NetClient::with_defaults().unwrap(),
                tx,
            )
            .unwrap();
            let err = pipeline.run().await.unwrap_err();

            match err {
                Error::Build(BuildError::BuildToolFailed { step, code, .. }) => {
                    assert_eq!(step, "compile");
                    assert_eq!(code, Some(3));
                }
                other => panic!("unexpected error {other:?}"),
            }
            assert!(!root.join("install").exists());
            assert!(!root.join("package").exists());

            let events = drain(&mut rx);
            assert!(events.iter().any(|event| matches!(
                event,
                AppEvent::Build(BuildEvent::StageFailed {
                    stage: Stage::Build,
                    ..
                })
            )));
            assert!(!events.iter().any(|event| matches!(
                event,
                AppEvent::Build(BuildEvent::StageStarted {
                    stage: Stage::Package,
                    ..
                })
            )));
            assert!(matches!(
                events.last(),
                Some(AppEvent::General(GeneralEvent::OperationFailed { failure, .. }))
                    if failure.code.as_deref() == Some("build.build_tool_failed")
            ));
        }

        #[tokio::test]
        async fn compile_failure_keeps_previous_install_and_package() {
            let server = MockServer::start_async().await;
            serve_llvm(&server).await;
            let temp = tempdir().unwrap();
            let tool = write_tool(temp.path(), true);
            let root = temp.path().join("stage");

            let previous: &[(&str, &[u8])] = &[
                ("install/include/old.h", b"old header"),
                ("install/lib/libold.a", b"old archive"),
                ("package/lib/libold.a", b"old archive"),
                ("package/bin/old", b"old binary"),
            ];
            for (path, data) in previous {
                let path = root.join(path);
                std::fs::create_dir_all(path.parent().unwrap()).unwrap();
                std::fs::write(path, data).unwrap();
            }
            let install_before = read_tree(&root.join("install"));
            let package_before = read_tree(&root.join("package"));

            let (tx, _rx) = channel();
            let pipeline = Pipeline::with_client(
                pipeline_config(&root, &server, &tool),
                Settings::host(),
                NetClient::with_defaults().unwrap(),
                tx,
            )
            .unwrap();
            let err = pipeline.run().await.unwrap_err();

            assert!(matches!(
                err,
                Error::Build(BuildError::BuildToolFailed { .. })
            ));
            assert_eq!(read_tree(&root.join("install")), install_before);
            assert_eq!(read_tree(&root.join("package")), package_before);
        }

        #[tokio::test]
        async fn build_without_fetched_sources_fails() {
            let temp = tempdir().unwrap();
            let tool = write_tool(temp.path(), false);
            let server = MockServer::start_async().await;
            let (tx, _rx) = channel();
            let pipeline = Pipeline::with_client(
                pipeline_config(temp.path(), &server, &tool),
                Settings::host(),
                NetClient::with_defaults().unwrap(),
                tx,
            )
            .unwrap();

            let err = pipeline.build().await.unwrap_err();
            assert!(matches!(
                err,
                Error::Build(BuildError::InvalidSourceManifest { .. })
            ));
        }
    }
}
