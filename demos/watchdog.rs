//! Background heartbeat that runs until ctrl-c.

use tokio_repeat::repeat;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt().init();

    let mut heartbeat = repeat(|call| async move {
        println!("heartbeat {call}");
        Ok(())
    });

    // returns immediately, the loop keeps ticking in the background
    heartbeat.every("1s").infinite();

    tokio::signal::ctrl_c().await.unwrap();
    heartbeat.stop();
    println!("stopped after {:?}", heartbeat.run_time().unwrap());
}
