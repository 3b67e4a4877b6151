//! Listing Tests

use native_feature_compiler::output::unit_ast::{MethodRef, Modifiers, THROWABLE};
use native_feature_compiler::output::{emit_listing, RoutineBuilder, UnitBuilder};

#[test]
fn should_render_exact_listing() {
    let print = MethodRef::new("demo.Out", "print", "void", &["java.lang.String"]);
    let length = MethodRef::new("java.lang.String", "length", "int", &[]);

    let mut unit = UnitBuilder::new("demo/Unit", "java.lang.Object", &["demo.Greeter"]);
    unit.add_annotation("demo.Generated");

    let hello = RoutineBuilder::new("hello", "int", &["java.lang.String"])
        .build(|body| {
            let name = body.param(0);
            let greeting = body.load_str("hi");
            body.invoke_static(&print, &[greeting]);
            let size = body.invoke_virtual(&length, name, &[]);
            body.return_value(size);
            Ok::<(), ()>(())
        })
        .unwrap();
    unit.define_routine(hello).unwrap();

    let guarded = RoutineBuilder::new("guarded", "void", &[])
        .with_modifiers(Modifiers::PRIVATE | Modifiers::STATIC)
        .build(|body| {
            body.try_catch(
                THROWABLE,
                |region| {
                    let values = region.new_array("int", 2);
                    let one = region.load_int(1);
                    region.array_store(values, 0, one);
                    Ok::<(), ()>(())
                },
                |_, _| Ok(()),
            )?;
            body.return_void();
            Ok::<(), ()>(())
        })
        .unwrap();
    unit.define_routine(guarded).unwrap();

    let listing = emit_listing(&unit.finish().unwrap());
    let expected = "\
@demo.Generated
unit demo.Unit extends java.lang.Object implements demo.Greeter

public routine hello(java.lang.String) -> int {
  %0 = param 0
  %1 = const \"hi\"
  invoke static demo.Out.print(java.lang.String) -> void (%1)
  %3 = invoke virtual java.lang.String.length() -> int on %0 ()
  return %3
}

private static routine guarded() -> void {
  try {
    %0 = new int[2]
    %1 = const 1
    %0[0] = %1
  } catch java.lang.Throwable %2 {
  }
  return
}
";
    assert_eq!(listing, expected);
}

#[test]
fn should_branch_with_else_block() {
    let mut unit = UnitBuilder::new("demo/Branch", "java.lang.Object", &[]);
    let routine = RoutineBuilder::new("pick", "java.lang.Object", &["boolean"])
        .build(|body| {
            let flag = body.param(0);
            let chosen = body.declare_variable("java.lang.Object");
            body.if_true(
                flag,
                |then| {
                    let yes = then.load_str("yes");
                    then.assign(chosen, yes);
                    Ok::<(), ()>(())
                },
                |otherwise| {
                    let none = otherwise.load_null();
                    otherwise.assign(chosen, none);
                    Ok(())
                },
            )?;
            body.return_value(chosen);
            Ok::<(), ()>(())
        })
        .unwrap();
    unit.define_routine(routine).unwrap();

    let listing = emit_listing(&unit.finish().unwrap());
    assert!(listing.contains(
        "  if %0 {\n    %2 = const \"yes\"\n    %1 := %2\n  } else {\n    %3 = const null\n    %1 := %3\n  }\n"
    ));
}
