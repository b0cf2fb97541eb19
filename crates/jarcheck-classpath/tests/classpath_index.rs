use jarcheck_classpath::{ClasspathEntry, ClasspathError, ClasspathIndex, JdkInstallation};
use jarcheck_resolve::{check_dependencies, ResolutionVerdict};
use jarcheck_test_utils::{ClassFileBuilder, JarFixture};
use jarcheck_types::{TypeDirectory, TypeRef};
use tempfile::TempDir;

fn object() -> ClassFileBuilder {
    ClassFileBuilder::new("java/lang/Object")
        .super_class(None)
        .method("toString", "()Ljava/lang/String;")
        .method("hashCode", "()I")
}

fn string() -> ClassFileBuilder {
    ClassFileBuilder::new("java/lang/String").field("value", "[B")
}

/// A fake JDK whose `java.base.jmod` carries `Object` and `String`.
fn fake_jdk(tmp: &TempDir) -> JdkInstallation {
    let root = tmp.path().join("jdk");
    std::fs::create_dir_all(root.join("jmods")).unwrap();
    JarFixture::new()
        .class_under("classes/", &object())
        .class_under("classes/", &string())
        .file("lib/libjava.so", b"\x7fELF".to_vec())
        .write(&root.join("jmods/java.base.jmod"))
        .unwrap();
    JdkInstallation::from_root(root).unwrap()
}

#[test]
fn lookup_from_jar_accepts_binary_and_internal_names() {
    let tmp = TempDir::new().unwrap();
    let jar = tmp.path().join("app.jar");
    JarFixture::new()
        .manifest("Manifest-Version: 1.0\n")
        .class(
            &ClassFileBuilder::new("com/example/Foo$Inner")
                .field("count", "I")
                .method("<init>", "()V")
                .method("name", "()Ljava/lang/String;"),
        )
        .write(&jar)
        .unwrap();

    let index = ClasspathIndex::build(&[ClasspathEntry::Jar(jar.clone())]).unwrap();
    assert_eq!(index.len(), 1);
    assert!(index.resolve("com.example.Foo$Inner"));
    assert!(index.resolve("com/example/Foo$Inner"));
    assert!(!index.resolve("com.example.Foo"));

    let shape = index.describe("com.example.Foo$Inner").unwrap();
    assert_eq!(shape.superclass, Some(TypeRef::named("java.lang.Object")));
    assert_eq!(shape.methods.len(), 1);
    assert_eq!(shape.methods[0].return_type, TypeRef::named("java.lang.String"));
    assert_eq!(index.origin("com.example.Foo$Inner"), Some(&ClasspathEntry::Jar(jar)));
}

#[test]
fn lookup_from_exploded_class_dir() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("classes");
    JarFixture::new()
        .class(&ClassFileBuilder::new("com/example/Bar"))
        .class(&ClassFileBuilder::new("com/example/package-info"))
        .file("com/example/notes.txt", b"not a class".to_vec())
        .write_exploded(&dir)
        .unwrap();

    let index = ClasspathIndex::build(&[ClasspathEntry::from_path(&dir)]).unwrap();
    assert!(index.resolve("com.example.Bar"));
    assert!(!index.resolve("com.example.package-info"));
    assert_eq!(index.len(), 1);
}

#[test]
fn jmod_only_indexes_classes_directory() {
    let tmp = TempDir::new().unwrap();
    let jdk = fake_jdk(&tmp);
    let entries = jdk.platform_entries().unwrap();

    let index = ClasspathIndex::build(&entries).unwrap();
    let names: Vec<&str> = index.iter_binary_names().collect();
    assert_eq!(names, vec!["java.lang.Object", "java.lang.String"]);
    assert_eq!(index.describe("java.lang.Object").unwrap().superclass, None);
}

#[test]
fn first_entry_wins_on_duplicate_classes() {
    let tmp = TempDir::new().unwrap();
    let one = tmp.path().join("one.jar");
    let two = tmp.path().join("two.jar");
    JarFixture::new()
        .class(&ClassFileBuilder::new("com/example/Dupe").method("fromOne", "()V"))
        .write(&one)
        .unwrap();
    JarFixture::new()
        .class(&ClassFileBuilder::new("com/example/Dupe").method("fromTwo", "()V"))
        .write(&two)
        .unwrap();

    let forward =
        ClasspathIndex::build(&[ClasspathEntry::Jar(one.clone()), ClasspathEntry::Jar(two.clone())])
            .unwrap();
    assert_eq!(forward.describe("com.example.Dupe").unwrap().methods[0].name, "fromOne");

    let reversed =
        ClasspathIndex::build(&[ClasspathEntry::Jar(two.clone()), ClasspathEntry::Jar(one)]).unwrap();
    assert_eq!(reversed.describe("com.example.Dupe").unwrap().methods[0].name, "fromTwo");
    assert_eq!(reversed.origin("com.example.Dupe"), Some(&ClasspathEntry::Jar(two)));
}

#[test]
fn multi_release_classes_fill_in_missing_base_classes_only() {
    let tmp = TempDir::new().unwrap();
    let jar = tmp.path().join("mr.jar");
    JarFixture::new()
        .manifest("Manifest-Version: 1.0\nMulti-Release: true\n")
        .class(&ClassFileBuilder::new("com/example/mr/Override").method("base", "()V"))
        .class_under(
            "META-INF/versions/11/",
            &ClassFileBuilder::new("com/example/mr/Override").method("v11", "()V"),
        )
        .class_under(
            "META-INF/versions/9/",
            &ClassFileBuilder::new("com/example/mr/Only").method("v9", "()V"),
        )
        .class_under(
            "META-INF/versions/17/",
            &ClassFileBuilder::new("com/example/mr/Only").method("v17", "()V"),
        )
        .write(&jar)
        .unwrap();

    let index = ClasspathIndex::build(&[ClasspathEntry::Jar(jar)]).unwrap();
    assert_eq!(
        index.describe("com.example.mr.Override").unwrap().methods[0].name,
        "base"
    );
    assert_eq!(index.describe("com.example.mr.Only").unwrap().methods[0].name, "v17");
}

#[test]
fn versioned_classes_are_ignored_without_multi_release_manifest() {
    let tmp = TempDir::new().unwrap();
    let jar = tmp.path().join("plain.jar");
    JarFixture::new()
        .manifest("Manifest-Version: 1.0\n")
        .class_under(
            "META-INF/versions/9/",
            &ClassFileBuilder::new("com/example/mr/Only"),
        )
        .write(&jar)
        .unwrap();

    let index = ClasspathIndex::build(&[ClasspathEntry::Jar(jar)]).unwrap();
    assert!(index.is_empty());
}

#[test]
fn missing_bundle_fails_construction() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nope.jar");
    let err = ClasspathIndex::build(&[ClasspathEntry::Jar(missing.clone())]).unwrap_err();
    assert!(matches!(err, ClasspathError::MissingEntry { ref path } if *path == missing));
}

#[test]
fn corrupt_archive_and_classfile_fail_construction() {
    let tmp = TempDir::new().unwrap();

    let not_zip = tmp.path().join("garbage.jar");
    std::fs::write(&not_zip, b"definitely not a zip").unwrap();
    let err = ClasspathIndex::build(&[ClasspathEntry::Jar(not_zip)]).unwrap_err();
    assert!(matches!(err, ClasspathError::Zip { .. }));

    let bad_class = tmp.path().join("bad.jar");
    JarFixture::new()
        .file("com/example/Broken.class", vec![0xCA, 0xFE, 0xBA, 0xBE, 0x00])
        .write(&bad_class)
        .unwrap();
    let err = ClasspathIndex::build(&[ClasspathEntry::Jar(bad_class)]).unwrap_err();
    match err {
        ClasspathError::ClassFile { member, .. } => assert_eq!(member, "com/example/Broken.class"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn walker_resolves_across_bundles_and_platform() {
    let tmp = TempDir::new().unwrap();
    let jdk = fake_jdk(&tmp);

    let app = tmp.path().join("app.jar");
    let lib = tmp.path().join("lib.jar");
    JarFixture::new()
        .class(
            &ClassFileBuilder::new("com/example/Main")
                .super_class(Some("com/example/Base"))
                .field("helper", "Lcom/example/lib/Helper;")
                .method("<init>", "(Lcom/example/OnlyInConstructor;)V")
                .method("main", "([Ljava/lang/String;)V"),
        )
        .class(&ClassFileBuilder::new("com/example/Base").method("names", "()[Ljava/lang/String;"))
        .write(&app)
        .unwrap();
    JarFixture::new()
        .class(&ClassFileBuilder::new("com/example/lib/Helper").field("x", "Lcom/example/Gone;"))
        .write(&lib)
        .unwrap();

    let mut entries = vec![ClasspathEntry::Jar(app.clone())];
    entries.extend(jdk.platform_entries().unwrap());

    // Without lib.jar the helper field type is missing.
    let index = ClasspathIndex::build(&entries).unwrap();
    let verdict = check_dependencies("com.example.Main", &index).unwrap();
    assert_eq!(verdict.missing_type(), Some("com.example.lib.Helper"));

    // With it, everything declared by Main and its ancestors resolves.
    entries.insert(1, ClasspathEntry::Jar(lib));
    let index = ClasspathIndex::build(&entries).unwrap();
    let verdict = check_dependencies("com.example.Main", &index).unwrap();
    assert_eq!(verdict, ResolutionVerdict::Satisfied);
}

#[test]
fn walker_reports_platform_superclass_when_no_jdk_is_indexed() {
    let tmp = TempDir::new().unwrap();
    let app = tmp.path().join("app.jar");
    JarFixture::new()
        .class(&ClassFileBuilder::new("com/example/Main"))
        .write(&app)
        .unwrap();

    let index = ClasspathIndex::build(&[ClasspathEntry::Jar(app)]).unwrap();
    let verdict = check_dependencies("com.example.Main", &index).unwrap();
    assert_eq!(verdict.missing_type(), Some("java.lang.Object"));
}

#[test]
fn interface_entry_does_not_walk_into_object() {
    let tmp = TempDir::new().unwrap();
    let app = tmp.path().join("app.jar");
    JarFixture::new()
        .class(
            &ClassFileBuilder::new("com/example/Api")
                .interface_type()
                .interface("com/example/Marker")
                .method("call", "(ILcom/example/Api;)V"),
        )
        .write(&app)
        .unwrap();

    let index = ClasspathIndex::build(&[ClasspathEntry::Jar(app)]).unwrap();
    assert_eq!(index.describe("com.example.Api").unwrap().superclass, None);
    let verdict = check_dependencies("com.example.Api", &index).unwrap();
    assert_eq!(verdict, ResolutionVerdict::Satisfied);
}

#[test]
fn inflated_size_in_zip_header_still_indexes() {
    let tmp = TempDir::new().unwrap();
    let jar = tmp.path().join("lying.jar");
    JarFixture::new()
        .class(&ClassFileBuilder::new("com/example/Small"))
        .write(&jar)
        .unwrap();

    // Claim an uncompressed size of almost 4 GiB in the central directory.
    let mut bytes = std::fs::read(&jar).unwrap();
    let header = bytes
        .windows(4)
        .position(|w| w == b"PK\x01\x02")
        .expect("central directory header");
    bytes[header + 24..header + 28].copy_from_slice(&0xFFFF_FFF0u32.to_le_bytes());
    std::fs::write(&jar, &bytes).unwrap();

    let index = ClasspathIndex::build(&[ClasspathEntry::Jar(jar)]).unwrap();
    assert!(index.resolve("com.example.Small"));
}
