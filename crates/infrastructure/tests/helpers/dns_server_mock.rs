#![allow(dead_code)]
use net_dns_query_domain::{Message, ResourceRecord, ResponseCode};
use net_dns_query_infrastructure::dns::wire::{decode, encode};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::sync::oneshot;

#[derive(Debug, Clone)]
pub enum MockMode {
    /// Answer every query with these records.
    Answer(Vec<ResourceRecord>),
    /// Answer over UDP with the wrong id only.
    WrongId,
    /// Send a truncated UDP answer; the full answer is only served over TCP.
    TruncateUdp(Vec<ResourceRecord>),
    /// First a datagram with a wrong id, then the real answer.
    WrongIdThenAnswer(Vec<ResourceRecord>),
}

/// Loopback DNS server answering on UDP and TCP at the same port.
pub struct MockDnsServer {
    addr: SocketAddr,
    udp_queries: Arc<AtomicUsize>,
    tcp_queries: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDnsServer {
    pub async fn start(mode: MockMode) -> std::io::Result<Self> {
        let socket = UdpSocket::bind("127.0.0.1:0").await?;
        let addr = socket.local_addr()?;
        let listener = TcpListener::bind(addr).await?;

        let udp_queries = Arc::new(AtomicUsize::new(0));
        let tcp_queries = Arc::new(AtomicUsize::new(0));
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let udp_count = Arc::clone(&udp_queries);
        let tcp_count = Arc::clone(&tcp_queries);
        tokio::spawn(async move {
            let mut buf = vec![0u8; 512];

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = socket.recv_from(&mut buf) => {
                        if let Ok((len, peer)) = result {
                            udp_count.fetch_add(1, Ordering::SeqCst);
                            for datagram in Self::udp_replies(&mode, &buf[..len]) {
                                let _ = socket.send_to(&datagram, peer).await;
                            }
                        }
                    }
                    accepted = listener.accept() => {
                        if let Ok((mut stream, _)) = accepted {
                            tcp_count.fetch_add(1, Ordering::SeqCst);
                            let mode = mode.clone();
                            tokio::spawn(async move {
                                let mut len_buf = [0u8; 2];
                                if stream.read_exact(&mut len_buf).await.is_err() {
                                    return;
                                }
                                let mut query = vec![0u8; usize::from(u16::from_be_bytes(len_buf))];
                                if stream.read_exact(&mut query).await.is_err() {
                                    return;
                                }
                                let response = Self::full_answer(&mode, &query);
                                let mut framed = (response.len() as u16).to_be_bytes().to_vec();
                                framed.extend_from_slice(&response);
                                let _ = stream.write_all(&framed).await;
                            });
                        }
                    }
                }
            }
        });

        Ok(Self {
            addr,
            udp_queries,
            tcp_queries,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn udp_queries(&self) -> usize {
        self.udp_queries.load(Ordering::SeqCst)
    }

    pub fn tcp_queries(&self) -> usize {
        self.tcp_queries.load(Ordering::SeqCst)
    }

    fn records(mode: &MockMode) -> Vec<ResourceRecord> {
        match mode {
            MockMode::Answer(records)
            | MockMode::TruncateUdp(records)
            | MockMode::WrongIdThenAnswer(records) => records.clone(),
            MockMode::WrongId => Vec::new(),
        }
    }

    fn full_answer(mode: &MockMode, query: &[u8]) -> Vec<u8> {
        let Ok(request) = decode(query) else {
            return Vec::new();
        };
        encode(&Message::response_to(&request, ResponseCode::NoError).with_answers(Self::records(mode)))
            .unwrap()
    }

    fn udp_replies(mode: &MockMode, query: &[u8]) -> Vec<Vec<u8>> {
        let Ok(request) = decode(query) else {
            return Vec::new();
        };
        let mut wrong = Message::response_to(&request, ResponseCode::NoError);
        wrong.header.id ^= 0xFFFF;

        match mode {
            MockMode::Answer(_) => vec![Self::full_answer(mode, query)],
            MockMode::WrongId => vec![encode(&wrong).unwrap()],
            MockMode::TruncateUdp(_) => {
                let mut truncated = Message::response_to(&request, ResponseCode::NoError);
                truncated.header.truncated = true;
                vec![encode(&truncated).unwrap()]
            }
            MockMode::WrongIdThenAnswer(_) => vec![encode(&wrong).unwrap(), Self::full_answer(mode, query)],
        }
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
