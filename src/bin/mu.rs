use std::{env, io, process, rc::Rc};

use mu::{repl, Config, Driver, Interpreter, SystemHost};

fn main() {
    mu::logging::init();

    let engine = Interpreter::new(Rc::new(SystemHost::new()));
    let mut driver = Driver::new(engine, Config::from_env(), io::stdout());

    let status = match driver.main(env::args(), &mut io::stdin(), repl::editor) {
        Ok(status) => status,
        Err(err) => {
            driver.report(&err);
            1
        }
    };
    driver.flush();
    process::exit(status);
}
